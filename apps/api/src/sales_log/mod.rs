// Sales activity log: daily reports kept in one local CSV file.
// Every access reads the whole file; appends rewrite it in full with no
// locking, so concurrent writers are last-writer-wins.

pub mod handlers;
pub mod store;

use thiserror::Error;

pub use store::{daily_activity_counts, SalesLog};

#[derive(Debug, Error)]
pub enum SalesLogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("sales log task failed: {0}")]
    Task(String),
}
