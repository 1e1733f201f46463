//! Link submission handlers.

use axum::{extract::State, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use rdfin_core::{Category, IngestBatch, IngestItem, LinkEntry, MediaTarget};

use super::error::{ApiError, ApiResult};
use super::forms::{parse_episode_lines, parse_movie_lines, JsonOrForm};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a structured batch
#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub category: Category,
    pub items: Vec<IngestItemBody>,
}

#[derive(Debug, Deserialize)]
pub struct IngestItemBody {
    pub raw_link: String,
    /// Movies without a title are named after the provider's filename
    pub title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Request body for pasted movie links
#[derive(Debug, Deserialize)]
pub struct MoviesBody {
    /// Title for lines that do not carry one
    pub title: Option<String>,
    pub links: String,
}

/// Request body for pasted episode links of one season
#[derive(Debug, Deserialize)]
pub struct EpisodesBody {
    pub show: String,
    pub season: u32,
    pub links: String,
    /// Number given to the first line without an episode marker
    pub first_episode: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub category: Category,
    pub date: NaiveDate,
    pub resolved: usize,
    pub failed: usize,
    pub entries: Vec<LinkEntry>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn run_batch(state: &AppState, batch: IngestBatch) -> ApiResult<Json<IngestResponse>> {
    let category = batch.category;
    let entries = state.orchestrator().ingest(batch).await?;
    let resolved = entries.iter().filter(|e| e.is_resolved()).count();

    Ok(Json(IngestResponse {
        category,
        date: Utc::now().date_naive(),
        resolved,
        failed: entries.len() - resolved,
        entries,
    }))
}

/// Ingest a structured batch
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> ApiResult<Json<IngestResponse>> {
    let category = body.category;
    let items = body
        .items
        .into_iter()
        .map(|item| -> ApiResult<IngestItem> {
            match item.title {
                Some(title) => {
                    let target =
                        MediaTarget::from_parts(category, title, item.season, item.episode)?;
                    Ok(IngestItem::new(target, item.raw_link))
                }
                None if category == Category::Movie => {
                    Ok(IngestItem::untitled_movie(item.raw_link))
                }
                None => Err(ApiError::BadRequest(format!(
                    "no show title for {}",
                    item.raw_link
                ))),
            }
        })
        .collect::<ApiResult<Vec<_>>>()?;

    run_batch(&state, IngestBatch::new(category, items)).await
}

/// Ingest pasted movie links
pub async fn add_movies(
    State(state): State<Arc<AppState>>,
    JsonOrForm(body): JsonOrForm<MoviesBody>,
) -> ApiResult<Json<IngestResponse>> {
    let items = parse_movie_lines(&body.links, body.title.as_deref())?;
    run_batch(&state, IngestBatch::new(Category::Movie, items)).await
}

/// Ingest pasted episode links
pub async fn add_episodes(
    State(state): State<Arc<AppState>>,
    JsonOrForm(body): JsonOrForm<EpisodesBody>,
) -> ApiResult<Json<IngestResponse>> {
    let items = parse_episode_lines(
        &body.links,
        &body.show,
        body.season,
        body.first_episode.unwrap_or(1),
    )?;
    run_batch(&state, IngestBatch::new(Category::Episode, items)).await
}
