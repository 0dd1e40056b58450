use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily sales activity report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub date: NaiveDate,
    pub salesperson: String,
    pub client: String,
    pub activity: String,
    pub result: String,
}

/// Number of reports filed on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivityCount {
    pub date: NaiveDate,
    pub count: usize,
}
