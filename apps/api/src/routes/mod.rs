pub mod forms;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::sales_log::handlers as sales;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(forms::index_handler))
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/matching/candidate-to-job",
            post(matching::handle_candidate_to_job),
        )
        .route(
            "/api/v1/matching/job-to-candidate",
            post(matching::handle_job_to_candidate),
        )
        // Sales activity log
        .route(
            "/api/v1/sales-reports",
            get(sales::handle_list_reports).post(sales::handle_create_report),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
