use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    config,
    crawler::{blackrock::BlackRock, QuotationSource},
    event, logging,
    series::store::SeriesStore,
};

/// 啟動排程
///
/// Registers the fund value job on `cron` (UTC) and starts the scheduler.
pub async fn start(sched: &JobScheduler, app: &config::App) -> Result<()> {
    let source: Arc<dyn QuotationSource + Send + Sync> =
        Arc::new(BlackRock::new(app.source.clone()));
    let store = Arc::new(SeriesStore::new(&app.store));

    let job = create_job(app.schedule.cron.clone(), move || {
        let source = source.clone();
        let store = store.clone();
        async move {
            event::fund_value::execute(source.as_ref(), store.as_ref())
                .await
                .map(|_| ())
        }
    })?;

    sched
        .add(job)
        .await
        .map_err(|why| anyhow!("Failed to add the job because {:?}", why))?;
    sched
        .start()
        .await
        .map_err(|why| anyhow!("Failed to start the scheduler because {:?}", why))?;

    logging::info_file_async(format!(
        "Scheduled the fund value job on '{}'",
        app.schedule.cron
    ));

    Ok(())
}

fn create_job<F, Fut>(cron_expr: String, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    let expr = cron_expr.clone();
    Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
        let task = task.clone();
        let expr = expr.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    expr, why
                ));
            }
        })
    })
    .map_err(|why| anyhow!("Invalid cron expression '{}' because {:?}", cron_expr, why))
}
