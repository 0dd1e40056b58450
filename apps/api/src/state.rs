use std::sync::Arc;

use crate::config::Config;
use crate::google::CorpusSource;
use crate::llm_client::Inference;
use crate::sales_log::SalesLog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Template + job record source. Default: `GoogleClient`.
    pub corpus: Arc<dyn CorpusSource>,
    /// Chat completion backend. Default: `LlmClient`.
    pub llm: Arc<dyn Inference>,
    pub sales_log: SalesLog,
}
