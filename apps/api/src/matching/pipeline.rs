//! Matching pipeline. Orchestrates one form submission end to end.
//!
//! Failure policy:
//! - missing fields / unsupported upload → `AppError`, before any remote call
//! - template or record fetch failure → warning, empty substitute, continue
//! - malformed upload or inference failure → `AppError`, request ends

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::extract::{extract_document, DocumentKind, UploadedDocument};
use crate::google::{CorpusSource, FetchError, FetchPlan, SheetRange};
use crate::llm_client::prompts::MATCHING_SYSTEM;
use crate::llm_client::Inference;
use crate::matching::prompts::{candidate_to_job_prompt, job_to_candidate_prompt};
use crate::models::record::RecordRow;

pub const REQUIRED_FIELDS_MESSAGE: &str = "すべての必須項目を入力してください。";
pub const JOB_TEXT_REQUIRED_MESSAGE: &str = "案件概要を入力してください。";
pub const EMPTY_SKILL_SHEET_MESSAGE: &str = "スキルシートからテキストを抽出できませんでした。";

const TEMPLATE_ERROR_PREFIX: &str = "ドキュメントの読み取り中にエラーが発生しました";
const RECORDS_ERROR_PREFIX: &str = "スプレッドシートデータ取得中にエラーが発生しました";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Candidate → job form submission.
#[derive(Debug, Clone, Default)]
pub struct CandidateMatchRequest {
    pub skill_sheet: Option<UploadedDocument>,
    pub candidate_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSource {
    Template,
    Records,
}

/// A remote fetch that failed and was replaced by an empty value.
#[derive(Debug, Clone, Serialize)]
pub struct FetchWarning {
    pub source: WarningSource,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordsStatus {
    Ok,
    Failed,
    NotRequested,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordsSummary {
    pub status: RecordsStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub match_id: Uuid,
    pub result: String,
    pub warnings: Vec<FetchWarning>,
    pub records: RecordsSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipelines
// ────────────────────────────────────────────────────────────────────────────

/// Candidate → job: finds the best job records for an uploaded skill sheet.
///
/// Steps:
/// 1. require skill sheet + candidate text
/// 2. classify the upload (unsupported type rejected here)
/// 3. extract skill sheet text
/// 4. fetch template + recent job records (degrading on failure)
/// 5. assemble prompt → inference
pub async fn match_candidate_to_jobs(
    corpus: &dyn CorpusSource,
    llm: &dyn Inference,
    config: &Config,
    request: CandidateMatchRequest,
) -> Result<MatchResponse, AppError> {
    let skill_sheet = match request.skill_sheet {
        Some(sheet) if !sheet.data.is_empty() && !request.candidate_text.trim().is_empty() => sheet,
        _ => return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
    };

    let match_id = Uuid::new_v4();
    let kind = DocumentKind::from_mime(&skill_sheet.content_type)?;
    info!(
        "[{match_id}] candidate → job: {} upload {:?}",
        kind, skill_sheet.file_name
    );

    let skill_sheet_text = extract_document(kind, skill_sheet).await?;
    if skill_sheet_text.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_SKILL_SHEET_MESSAGE.to_string()));
    }

    let plan = FetchPlan {
        template_doc_id: config.candidate_template_doc_id.clone(),
        records: Some(SheetRange {
            spreadsheet_id: config.job_records_sheet_id.clone(),
            range: config.job_records_range.clone(),
        }),
    };
    let corpus = corpus.fetch(&plan).await;

    let mut warnings = Vec::new();
    let template = template_or_empty(corpus.template, &mut warnings);
    let (records, summary) = records_or_empty(corpus.records, &mut warnings);

    let prompt =
        candidate_to_job_prompt(&template, &request.candidate_text, &skill_sheet_text, &records);
    info!(
        "[{match_id}] prompt assembled: {} chars, {} records, {} warnings",
        prompt.chars().count(),
        summary.count,
        warnings.len()
    );

    let result = llm.complete(MATCHING_SYSTEM, &prompt).await?;

    Ok(MatchResponse {
        match_id,
        result,
        warnings,
        records: summary,
    })
}

/// Job → candidate: template plus the job description, no upload or records.
pub async fn match_job_to_candidates(
    corpus: &dyn CorpusSource,
    llm: &dyn Inference,
    config: &Config,
    job_text: &str,
) -> Result<MatchResponse, AppError> {
    if job_text.trim().is_empty() {
        return Err(AppError::Validation(JOB_TEXT_REQUIRED_MESSAGE.to_string()));
    }

    let match_id = Uuid::new_v4();
    info!("[{match_id}] job → candidate");

    let plan = FetchPlan {
        template_doc_id: config.job_template_doc_id.clone(),
        records: None,
    };
    let corpus = corpus.fetch(&plan).await;

    let mut warnings = Vec::new();
    let template = template_or_empty(corpus.template, &mut warnings);
    let (_, summary) = records_or_empty(corpus.records, &mut warnings);

    let prompt = job_to_candidate_prompt(&template, job_text);
    info!(
        "[{match_id}] prompt assembled: {} chars",
        prompt.chars().count()
    );

    let result = llm.complete(MATCHING_SYSTEM, &prompt).await?;

    Ok(MatchResponse {
        match_id,
        result,
        warnings,
        records: summary,
    })
}

fn template_or_empty(
    template: Result<String, FetchError>,
    warnings: &mut Vec<FetchWarning>,
) -> String {
    template.unwrap_or_else(|e| {
        warn!("Template fetch failed, continuing without template: {e}");
        warnings.push(FetchWarning {
            source: WarningSource::Template,
            message: format!("{TEMPLATE_ERROR_PREFIX}: {e}"),
        });
        String::new()
    })
}

fn records_or_empty(
    records: Option<Result<Vec<RecordRow>, FetchError>>,
    warnings: &mut Vec<FetchWarning>,
) -> (Vec<RecordRow>, RecordsSummary) {
    match records {
        None => (
            Vec::new(),
            RecordsSummary {
                status: RecordsStatus::NotRequested,
                count: 0,
            },
        ),
        Some(Ok(rows)) => {
            let count = rows.len();
            (
                rows,
                RecordsSummary {
                    status: RecordsStatus::Ok,
                    count,
                },
            )
        }
        Some(Err(e)) => {
            warn!("Record fetch failed, continuing without records: {e}");
            warnings.push(FetchWarning {
                source: WarningSource::Records,
                message: format!("{RECORDS_ERROR_PREFIX}: {e}"),
            });
            (
                Vec::new(),
                RecordsSummary {
                    status: RecordsStatus::Failed,
                    count: 0,
                },
            )
        }
    }
}
