use serde::{Deserialize, Serialize};

/// Index of the flag column ("F"). Rows whose flag is not `false` were
/// already handled and are never offered for matching.
pub const FLAG_COLUMN: usize = 5;

/// Only the most recent eligible rows are kept; bounds the prompt size.
pub const MAX_RECENT_RECORDS: usize = 50;

/// One job record row as returned by the spreadsheet, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordRow {
    pub cells: Vec<String>,
}

impl RecordRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// A row is eligible when it has a flag column and the flag reads `false`
    /// (trimmed, any case).
    pub fn is_eligible(&self) -> bool {
        self.cells.len() > FLAG_COLUMN
            && self.cells[FLAG_COLUMN].trim().to_lowercase() == "false"
    }

    pub fn date(&self) -> &str {
        self.cell(0)
    }

    pub fn subject(&self) -> &str {
        self.cell(3)
    }

    pub fn body(&self) -> &str {
        self.cell(4)
    }

    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// Keeps eligible rows and returns the last `MAX_RECENT_RECORDS` of them in
/// their original order.
pub fn recent_eligible(rows: Vec<RecordRow>) -> Vec<RecordRow> {
    let mut eligible: Vec<RecordRow> = rows.into_iter().filter(RecordRow::is_eligible).collect();
    let excess = eligible.len().saturating_sub(MAX_RECENT_RECORDS);
    eligible.drain(..excess);
    eligible
}
