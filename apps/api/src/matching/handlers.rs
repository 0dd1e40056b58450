//! Axum route handlers for the Matching API.

use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::extract::UploadedDocument;
use crate::matching::pipeline::{
    match_candidate_to_jobs, match_job_to_candidates, CandidateMatchRequest, MatchResponse,
};
use crate::state::AppState;

const SKILL_SHEET_FIELD: &str = "skill_sheet";
const CANDIDATE_TEXT_FIELD: &str = "candidate_text";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct JobMatchRequest {
    #[serde(default)]
    pub job_text: String,
}

/// POST /api/v1/matching/candidate-to-job
///
/// Multipart form: `skill_sheet` (PDF / Excel / Word file) and `candidate_text`.
pub async fn handle_candidate_to_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let request = read_candidate_form(multipart).await?;
    let response = match_candidate_to_jobs(
        state.corpus.as_ref(),
        state.llm.as_ref(),
        &state.config,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/v1/matching/job-to-candidate
pub async fn handle_job_to_candidate(
    State(state): State<AppState>,
    Json(request): Json<JobMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_job_to_candidates(
        state.corpus.as_ref(),
        state.llm.as_ref(),
        &state.config,
        &request.job_text,
    )
    .await?;
    Ok(Json(response))
}

/// Reads the candidate form. Unknown fields are ignored; a file input left
/// empty by the browser counts as missing.
async fn read_candidate_form(mut multipart: Multipart) -> Result<CandidateMatchRequest, AppError> {
    let mut request = CandidateMatchRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(SKILL_SHEET_FIELD) => {
                let document = read_upload(field).await?;
                if !document.data.is_empty() {
                    request.skill_sheet = Some(document);
                }
            }
            Some(CANDIDATE_TEXT_FIELD) => {
                request.candidate_text = field.text().await.map_err(invalid_form)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn read_upload(field: Field<'_>) -> Result<UploadedDocument, AppError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    let data = field.bytes().await.map_err(invalid_form)?;
    Ok(UploadedDocument {
        file_name,
        content_type,
        data,
    })
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid form submission: {err}"))
}
