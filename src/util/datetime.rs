use chrono::{NaiveDate, Utc};

/// Today's calendar date on the UTC clock.
///
/// Every date stamped on a sample comes from here so a run near midnight never mixes
/// local and UTC days.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
