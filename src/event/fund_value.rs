use anyhow::Result;

use crate::{
    crawler::QuotationSource,
    logging,
    series::{store::SeriesStore, MergeOutcome},
};

/// Fetches today's value and folds it into the persisted series.
///
/// A fetch failure returns before the state file is even read. The file is rewritten only
/// when the merge changed something.
pub async fn execute<S>(source: &S, store: &SeriesStore) -> Result<MergeOutcome>
where
    S: QuotationSource + Sync + ?Sized,
{
    let sample = source.fetch().await?;
    let mut series = store.load();
    let outcome = series.merge(sample);

    match outcome {
        MergeOutcome::Unchanged => {
            let latest = series.latest().map(|r| r.close).unwrap_or_default();
            logging::info_file_async(format!(
                "The last read value ({}) is the same as the new value ({}). Skipping update.",
                latest, sample.value
            ));
            return Ok(outcome);
        }
        MergeOutcome::Replaced => logging::info_file_async(format!(
            "Updating record for {} with new value {}.",
            sample.date, sample.value
        )),
        MergeOutcome::Prepended => logging::info_file_async(format!(
            "Prepending a new record for {} with value {}.",
            sample.date, sample.value
        )),
    }

    store.save(&series)?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::{
        config,
        series::{Record, Sample, Series},
    };

    struct Fixed(Sample);

    #[async_trait]
    impl QuotationSource for Fixed {
        async fn fetch(&self) -> Result<Sample> {
            Ok(self.0)
        }
    }

    struct Broken;

    #[async_trait]
    impl QuotationSource for Broken {
        async fn fetch(&self) -> Result<Sample> {
            Err(anyhow!("connection reset"))
        }
    }

    /// 依序回傳預先排好的樣本
    struct Replay(Mutex<Vec<Sample>>);

    #[async_trait]
    impl QuotationSource for Replay {
        async fn fetch(&self) -> Result<Sample> {
            self.0
                .lock()
                .map_err(|why| anyhow!("{:?}", why))?
                .pop()
                .ok_or_else(|| anyhow!("no more samples"))
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn temp_store() -> (TempDir, SeriesStore) {
        let dir = tempdir().unwrap();
        let store = SeriesStore::new(&config::Store {
            path: dir.path().join("fund.json").to_string_lossy().to_string(),
        });
        (dir, store)
    }

    #[tokio::test]
    async fn test_execute_first_run() {
        let (_dir, store) = temp_store();
        let source = Fixed(Sample::new(date("2024-06-01"), 118.58));

        let outcome = execute(&source, &store).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Prepended);
        assert_eq!(
            store.load(),
            Series::from(vec![Record::new(date("2024-06-01"), 118.58)])
        );
    }

    #[tokio::test]
    async fn test_execute_unchanged_does_not_write() {
        let (_dir, store) = temp_store();
        store
            .save(&Series::from(vec![Record::new(date("2024-06-01"), 118.58)]))
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();
        // 以不同格式寫回，若被覆寫就會看得出來
        let compact = before.replace("    ", "").replace('\n', "");
        fs::write(store.path(), &compact).unwrap();

        let source = Fixed(Sample::new(date("2024-06-02"), 118.58));
        let outcome = execute(&source, &store).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), compact);
    }

    #[tokio::test]
    async fn test_execute_fetch_failure_leaves_state() {
        let (_dir, store) = temp_store();
        store
            .save(&Series::from(vec![Record::new(date("2024-06-01"), 118.58)]))
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(execute(&Broken, &store).await.is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_execute_fetch_failure_creates_nothing() {
        let (_dir, store) = temp_store();

        assert!(execute(&Broken, &store).await.is_err());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_execute_corrupt_state_starts_over() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "not json").unwrap();

        let source = Fixed(Sample::new(date("2024-06-01"), 118.58));
        let outcome = execute(&source, &store).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Prepended);
        assert_eq!(store.load().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_several_runs() {
        let (_dir, store) = temp_store();
        // pop() 從尾端取出，因此倒序排列
        let source = Replay(Mutex::new(vec![
            Sample::new(date("2024-06-03"), 118.64),
            Sample::new(date("2024-06-02"), 118.60),
            Sample::new(date("2024-06-02"), 118.58),
            Sample::new(date("2024-06-01"), 118.58),
        ]));

        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(execute(&source, &store).await.unwrap());
        }

        assert_eq!(
            outcomes,
            vec![
                MergeOutcome::Prepended,
                MergeOutcome::Unchanged,
                MergeOutcome::Prepended,
                MergeOutcome::Prepended,
            ]
        );
        assert_eq!(
            store.load(),
            Series::from(vec![
                Record::new(date("2024-06-03"), 118.64),
                Record::new(date("2024-06-02"), 118.60),
                Record::new(date("2024-06-01"), 118.58),
            ])
        );
        assert!(execute(&source, &store).await.is_err());
    }
}
