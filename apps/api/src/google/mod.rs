//! Remote corpus fetcher: prompt templates from Google Docs and job records
//! from Google Sheets.
//!
//! Authentication happens once per request; the template and the records are
//! then fetched concurrently. Each fetch fails independently: callers receive
//! one `Result` per resource and decide how to degrade.

pub mod auth;
pub mod docs;
pub mod sheets;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::record::{recent_eligible, RecordRow};

use self::auth::ServiceAccount;
use self::docs::Document;
use self::sheets::{values_url, ValueRange};

const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1/documents";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// A spreadsheet identifier plus an A1 range within it.
#[derive(Debug, Clone)]
pub struct SheetRange {
    pub spreadsheet_id: String,
    pub range: String,
}

/// What one matching request needs from the remote stores.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub template_doc_id: String,
    /// `None` when the direction does not use job records.
    pub records: Option<SheetRange>,
}

/// Outcome of a fetch. "Failed" and "succeeded with zero eligible rows" stay
/// distinguishable: the former is `Err`, the latter `Ok(vec![])`.
#[derive(Debug)]
pub struct FetchedCorpus {
    pub template: Result<String, FetchError>,
    pub records: Option<Result<Vec<RecordRow>, FetchError>>,
}

/// Source of templates and job records. Carried in `AppState` as
/// `Arc<dyn CorpusSource>`; swapped for a stub in tests.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn fetch(&self, plan: &FetchPlan) -> FetchedCorpus;
}

/// Docs/Sheets client authenticated with a service account.
#[derive(Clone)]
pub struct GoogleClient {
    http: Client,
    account: ServiceAccount,
}

impl GoogleClient {
    pub fn new(account: ServiceAccount) -> Result<Self, FetchError> {
        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            account,
        })
    }

    /// Returns the document's paragraph text.
    pub async fn document_text(&self, token: &str, document_id: &str) -> Result<String, FetchError> {
        let url = format!("{DOCS_API_BASE}/{document_id}");
        let document: Document = self.get_json(token, &url).await?;
        let text = document.text();
        info!(
            "Fetched template document {document_id} ({} chars)",
            text.chars().count()
        );
        Ok(text)
    }

    /// Returns the most recent eligible rows of the range, in sheet order.
    pub async fn recent_records(
        &self,
        token: &str,
        sheet: &SheetRange,
    ) -> Result<Vec<RecordRow>, FetchError> {
        let url = values_url(&sheet.spreadsheet_id, &sheet.range)?;
        let values: ValueRange = self.get_json(token, url.as_str()).await?;
        let rows = values.into_rows();
        let total = rows.len();
        let recent = recent_eligible(rows);
        info!(
            "Fetched {total} rows from sheet {}; {} eligible records kept",
            sheet.spreadsheet_id,
            recent.len()
        );
        Ok(recent)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<T, FetchError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

/// Google's JSON error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, serde::Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Falls back to the raw body when it is not Google's error envelope.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<GoogleErrorBody>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[async_trait]
impl CorpusSource for GoogleClient {
    async fn fetch(&self, plan: &FetchPlan) -> FetchedCorpus {
        let token = match self.account.access_token(&self.http).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Google authentication failed: {e}");
                return FetchedCorpus {
                    template: Err(e.clone()),
                    records: plan.records.as_ref().map(|_| Err(e)),
                };
            }
        };

        let template = self.document_text(&token, &plan.template_doc_id);
        let records = async {
            match &plan.records {
                Some(sheet) => Some(self.recent_records(&token, sheet).await),
                None => None,
            }
        };
        let (template, records) = tokio::join!(template, records);

        FetchedCorpus { template, records }
    }
}
