//! Day log handlers: listing, refresh and deletion.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use rdfin_core::{Category, DeleteReport, LinkEntry, RefreshOutcome, RefreshStatus};

use super::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DaysResponse {
    pub category: Category,
    pub days: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub category: Category,
    pub date: NaiveDate,
    pub entries: Vec<LinkEntry>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub category: Category,
    pub date: NaiveDate,
    pub refreshed: usize,
    pub failed: usize,
    pub outcomes: Vec<RefreshOutcome>,
}

pub(crate) fn parse_category(value: &str) -> ApiResult<Category> {
    value.parse::<Category>().map_err(ApiError::from)
}

fn parse_date(value: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

/// List the days with a log in a category, newest first
pub async fn list_days(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<Json<DaysResponse>> {
    let category = parse_category(&category)?;
    let days = state.ledger().list_days(category)?;
    Ok(Json(DaysResponse { category, days }))
}

/// Entries of one day log
pub async fn get_day(
    State(state): State<Arc<AppState>>,
    Path((category, date)): Path<(String, String)>,
) -> ApiResult<Json<DayResponse>> {
    let category = parse_category(&category)?;
    let date = parse_date(&date)?;
    let entries = state.ledger().list(category, date)?;
    Ok(Json(DayResponse {
        category,
        date,
        entries,
    }))
}

/// Re-resolve every link of a day log
pub async fn refresh_day(
    State(state): State<Arc<AppState>>,
    Path((category, date)): Path<(String, String)>,
) -> ApiResult<Json<RefreshResponse>> {
    let category = parse_category(&category)?;
    let date = parse_date(&date)?;
    let outcomes = state.ledger().refresh(category, date).await?;

    let count = |status: RefreshStatus| outcomes.iter().filter(|o| o.status == status).count();
    let refreshed = count(RefreshStatus::Refreshed);
    let failed = count(RefreshStatus::Failed);

    Ok(Json(RefreshResponse {
        category,
        date,
        refreshed,
        failed,
        outcomes,
    }))
}

/// Remove a day log and every `.strm` file it references
pub async fn delete_day(
    State(state): State<Arc<AppState>>,
    Path((category, date)): Path<(String, String)>,
) -> ApiResult<Json<DeleteReport>> {
    let category = parse_category(&category)?;
    let date = parse_date(&date)?;
    let report = state.ledger().delete(category, date).await?;
    Ok(Json(report))
}
