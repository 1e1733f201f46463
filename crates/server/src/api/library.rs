//! Library browsing handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use rdfin_core::{recent_strm_files, StrmFileInfo};

use super::error::ApiResult;
use super::logs::parse_category;
use crate::state::AppState;

/// Maximum allowed limit for recent file queries
const MAX_LIMIT: usize = 1000;

/// Default limit for recent file queries
const DEFAULT_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    /// `movie`/`movies` or `episode`/`tv`; both when absent
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub files: Vec<StrmFileInfo>,
    pub limit: usize,
}

/// Most recently written `.strm` files
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> ApiResult<Json<RecentResponse>> {
    let category = params
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(parse_category)
        .transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let files = recent_strm_files(state.media_root(), category, limit).await?;
    Ok(Json(RecentResponse { files, limit }))
}
