use anyhow::{Context, Result};

const DEFAULT_CANDIDATE_TEMPLATE_DOC_ID: &str = "1HjjtYZ1RCTPSXLxW5ujCviIwCdMi2a4gTB7y5wARht0";
const DEFAULT_JOB_TEMPLATE_DOC_ID: &str = "1ltCJ2yi4Ksz98d_ubjDlC0p8GQsLvnm18mg9YNU9LVo";
const DEFAULT_JOB_RECORDS_SHEET_ID: &str = "1amJJDVMr3__OmLgWo1Z9w6FXZ9aMaNm0WRlx1_TYXnE";
const DEFAULT_JOB_RECORDS_RANGE: &str = "'【自動】raw'!A:L";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Loaded once in `main`, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub google_service_account_file: String,
    /// Template prefixed to every candidate → job prompt.
    pub candidate_template_doc_id: String,
    /// Template prefixed to every job → candidate prompt.
    pub job_template_doc_id: String,
    pub job_records_sheet_id: String,
    pub job_records_range: String,
    pub sales_log_path: String,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            google_service_account_file: env_or(
                "GOOGLE_SERVICE_ACCOUNT_FILE",
                "service_account.json",
            ),
            candidate_template_doc_id: env_or(
                "CANDIDATE_TEMPLATE_DOC_ID",
                DEFAULT_CANDIDATE_TEMPLATE_DOC_ID,
            ),
            job_template_doc_id: env_or("JOB_TEMPLATE_DOC_ID", DEFAULT_JOB_TEMPLATE_DOC_ID),
            job_records_sheet_id: env_or("JOB_RECORDS_SHEET_ID", DEFAULT_JOB_RECORDS_SHEET_ID),
            job_records_range: env_or("JOB_RECORDS_RANGE", DEFAULT_JOB_RECORDS_RANGE),
            sales_log_path: env_or("SALES_LOG_PATH", "sales_reports.csv"),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for handler and pipeline tests. Never touches the environment.
    pub fn for_tests(sales_log_path: &str) -> Self {
        Config {
            openai_api_key: "sk-test".to_string(),
            google_service_account_file: "service_account.json".to_string(),
            candidate_template_doc_id: "candidate-template".to_string(),
            job_template_doc_id: "job-template".to_string(),
            job_records_sheet_id: "job-sheet".to_string(),
            job_records_range: DEFAULT_JOB_RECORDS_RANGE.to_string(),
            sales_log_path: sales_log_path.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
