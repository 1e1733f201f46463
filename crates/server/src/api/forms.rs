//! Pasted link lists, submitted as JSON or as an HTML form.
//!
//! One link per line. Blank lines and lines starting with `#` are ignored.
//! A line may carry an annotation after a `|`: a title for movies, an
//! episode marker (`S01E03` or `E03`) for episodes. Movie lines with no
//! title at all are named once the link resolves.

use axum::{
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::de::DeserializeOwned;

use rdfin_core::{IngestItem, MediaTarget};

use super::error::ApiError;

static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bS(\d{1,3})[ ._-]?E(\d{1,4})\b").unwrap());
static EPISODE_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:E|EP)\s*(\d{1,4})$").unwrap());

/// Body extractor accepting `application/json` or a url-encoded form.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

/// Non-empty, non-comment lines with their 1-based line numbers.
fn link_lines(text: &str) -> impl Iterator<Item = (usize, &str, Option<&str>)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| match line.split_once('|') {
            Some((link, note)) => {
                let note = note.trim();
                (n, link.trim(), (!note.is_empty()).then_some(note))
            }
            None => (n, line, None),
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Movie items from pasted lines. A per-line title wins over `default_title`;
/// a line with neither is named after the provider's filename.
pub fn parse_movie_lines(
    text: &str,
    default_title: Option<&str>,
) -> Result<Vec<IngestItem>, ApiError> {
    let default_title = non_blank(default_title);

    let items = link_lines(text)
        .map(|(_, link, note)| -> Result<IngestItem, ApiError> {
            match note.or(default_title) {
                Some(title) => Ok(IngestItem::new(MediaTarget::movie(title)?, link)),
                None => Ok(IngestItem::untitled_movie(link)),
            }
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    if items.is_empty() {
        return Err(ApiError::BadRequest("no links submitted".to_string()));
    }
    Ok(items)
}

/// Season and episode named by a line, if it names one.
fn episode_marker(link: &str, note: Option<&str>) -> Option<(Option<u32>, u32)> {
    if let Some(note) = note {
        if let Some(caps) = EPISODE_ONLY.captures(note) {
            return caps[1].parse().ok().map(|e| (None, e));
        }
    }
    let haystacks = note.into_iter().chain(std::iter::once(link));
    for text in haystacks {
        if let Some(caps) = SEASON_EPISODE.captures(text) {
            if let (Ok(s), Ok(e)) = (caps[1].parse(), caps[2].parse()) {
                return Some((Some(s), e));
            }
        }
    }
    None
}

/// Episode items from pasted lines.
///
/// Lines without a marker are numbered from `first_episode`; numbering
/// continues after the last explicit episode.
pub fn parse_episode_lines(
    text: &str,
    show: &str,
    season: u32,
    first_episode: u32,
) -> Result<Vec<IngestItem>, ApiError> {
    let mut next = Some(first_episode);
    let mut items = Vec::new();

    for (n, link, note) in link_lines(text) {
        let (line_season, episode) = match (episode_marker(link, note), next) {
            (Some((s, e)), _) => (s.unwrap_or(season), e),
            (None, Some(e)) => (season, e),
            (None, None) => {
                return Err(ApiError::BadRequest(format!(
                    "line {}: episode number out of range",
                    n
                )))
            }
        };
        next = episode.checked_add(1);
        items.push(IngestItem::new(
            MediaTarget::episode(show, line_season, episode)?,
            link,
        ));
    }

    if items.is_empty() {
        return Err(ApiError::BadRequest("no links submitted".to_string()));
    }
    Ok(items)
}
