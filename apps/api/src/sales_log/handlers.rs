//! Axum route handlers for the sales activity log.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::sales_report::{DailyActivityCount, SalesReport};
use crate::sales_log::daily_activity_counts;
use crate::state::AppState;

pub const ALL_FIELDS_REQUIRED_MESSAGE: &str = "すべてのフィールドを入力してください。";

/// Report submission. `date` defaults to today when omitted.
#[derive(Debug, Deserialize)]
pub struct NewSalesReport {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub salesperson: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub result: String,
}

impl NewSalesReport {
    fn into_report(self, today: NaiveDate) -> Result<SalesReport, AppError> {
        let fields = [&self.salesperson, &self.client, &self.activity, &self.result];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::Validation(ALL_FIELDS_REQUIRED_MESSAGE.to_string()));
        }

        Ok(SalesReport {
            date: self.date.unwrap_or(today),
            salesperson: self.salesperson,
            client: self.client,
            activity: self.activity,
            result: self.result,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SalesReportsResponse {
    pub reports: Vec<SalesReport>,
    pub daily_counts: Vec<DailyActivityCount>,
}

#[derive(Debug, Serialize)]
pub struct SalesReportCreated {
    pub report: SalesReport,
    pub total_reports: usize,
}

/// GET /api/v1/sales-reports
pub async fn handle_list_reports(
    State(state): State<AppState>,
) -> Result<Json<SalesReportsResponse>, AppError> {
    let reports = state.sales_log.load().await?;
    let daily_counts = daily_activity_counts(&reports);
    Ok(Json(SalesReportsResponse {
        reports,
        daily_counts,
    }))
}

/// POST /api/v1/sales-reports
pub async fn handle_create_report(
    State(state): State<AppState>,
    Json(request): Json<NewSalesReport>,
) -> Result<(StatusCode, Json<SalesReportCreated>), AppError> {
    let report = request.into_report(Local::now().date_naive())?;
    let total_reports = state.sales_log.append(report.clone()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SalesReportCreated {
            report,
            total_reports,
        }),
    ))
}
