use std::ops::Deref;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 淨值序列的讀寫
pub mod store;

/// One calendar day's observation of the fund.
///
/// The page publishes a single unit value per day, so every price field carries the
/// same number and `volume` is always `null`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: Option<f64>,
}

impl Record {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Record {
            date,
            open: value,
            high: value,
            low: value,
            close: value,
            adjusted_close: value,
            volume: None,
        }
    }
}

/// A value observed by a quotation source together with the day it belongs to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub date: NaiveDate,
    pub value: f64,
}

impl Sample {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Sample { date, value }
    }
}

/// What a merge did to the series.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum MergeOutcome {
    /// 最新一筆的收盤值與新值相同，不做任何事
    Unchanged,
    /// 最新一筆是同一天，以新值取代
    Replaced,
    /// 新的一天，插入到最前面
    Prepended,
}

/// Daily records ordered most-recent-first; index 0 is the latest day.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn latest(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Reconciles a newly observed sample with the series.
    ///
    /// * The latest record already closes at exactly `sample.value`: nothing changes,
    ///   whatever the date of the sample.
    /// * The latest record is from `sample.date`: it is replaced by a fresh record.
    /// * Otherwise a fresh record is inserted at index 0 and every existing record shifts
    ///   back by one, untouched.
    pub fn merge(&mut self, sample: Sample) -> MergeOutcome {
        let latest_date = match self.latest() {
            Some(latest) if latest.close == sample.value => return MergeOutcome::Unchanged,
            Some(latest) => Some(latest.date),
            None => None,
        };

        let record = Record::new(sample.date, sample.value);
        if latest_date == Some(sample.date) {
            self.records[0] = record;
            MergeOutcome::Replaced
        } else {
            self.records.insert(0, record);
            MergeOutcome::Prepended
        }
    }
}

impl From<Vec<Record>> for Series {
    fn from(records: Vec<Record>) -> Self {
        Series { records }
    }
}

impl Deref for Series {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
