//! Google Sheets v4: job records are read from a fixed A1 range.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::models::record::RecordRow;

use super::FetchError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// `spreadsheets.values.get` response. `values` is omitted by the API when
/// the range is empty.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Vec<RecordRow> {
        self.values
            .into_iter()
            .map(|row| RecordRow::new(row.into_iter().map(cell_text).collect()))
            .collect()
    }
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Builds the values URL, percent-encoding the range as one path segment.
pub fn values_url(spreadsheet_id: &str, range: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(SHEETS_API_BASE).map_err(|e| FetchError::Decode(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Decode("sheets base URL cannot hold a path".to_string()))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
    url.query_pairs_mut()
        .append_pair("valueRenderOption", "FORMATTED_VALUE");
    Ok(url)
}
