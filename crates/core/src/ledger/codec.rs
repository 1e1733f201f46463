//! Line format for day log files.
//!
//! One entry per line:
//!
//! ```text
//! 2024-05-01T10:00:00.000Z | status=resolved | category=episode | title=Foo | season=1 | episode=3 | link=... | url=... | strm=tv/Foo/...
//! ```
//!
//! Values are percent-encoded so separators and newlines inside them are
//! harmless. Unknown keys are ignored on read.
//!
//! Logs written by the earlier script use
//! `<timestamp> | link=<link> | target=<absolute .strm path> | rd_filename=<name>`
//! and are still readable.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::error::LedgerError;
use super::types::{LinkEntry, LinkStatus};
use crate::media::{Category, MediaTarget};

const SEPARATOR: &str = " | ";

static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)S(\d{1,3})[ ._-]?E(\d{1,4})").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,3}").unwrap());

/// Encode an entry as a single line, without the trailing newline.
pub fn encode_entry(entry: &LinkEntry) -> String {
    let mut fields = vec![entry
        .added_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)];

    push(&mut fields, "status", entry.status.as_str());
    push(&mut fields, "category", entry.target.category().as_str());
    push(&mut fields, "title", entry.target.title());
    if let Some(season) = entry.target.season() {
        push(&mut fields, "season", &season.to_string());
    }
    if let Some(episode) = entry.target.episode_number() {
        push(&mut fields, "episode", &episode.to_string());
    }
    push(&mut fields, "link", &entry.raw_link);
    if let Some(url) = &entry.resolved_url {
        push(&mut fields, "url", url);
    }
    if let Some(path) = &entry.strm_path {
        push(&mut fields, "strm", &slash_path(path));
    }
    if let Some(filename) = &entry.filename {
        push(&mut fields, "filename", filename);
    }
    if let Some(expires_at) = &entry.expires_at {
        push(
            &mut fields,
            "expires",
            &expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }
    if let Some(reason) = &entry.error_reason {
        push(&mut fields, "error", reason);
    }

    fields.join(SEPARATOR)
}

/// Decode one line of a DayLog file of the given category.
///
/// Reads lines written by [`encode_entry`] as well as the older
/// `link=... | target=... | rd_filename=...` lines, whose target is inferred
/// from the recorded file path.
pub fn decode_line(line: &str, category: Category) -> Result<LinkEntry, LedgerError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut parts = line.split(SEPARATOR);

    let timestamp = parts.next().unwrap_or_default().trim();
    let added_at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| LedgerError::Codec(format!("bad timestamp {:?}: {}", timestamp, e)))?
        .with_timezone(&Utc);

    let mut raw: HashMap<&str, &str> = HashMap::new();
    for part in parts {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| LedgerError::Codec(format!("field without '=': {:?}", part)))?;
        raw.insert(key.trim(), value);
    }

    if raw.contains_key("status") {
        decode_fields(added_at, &raw)
    } else if raw.contains_key("target") {
        decode_legacy_fields(added_at, &raw, category)
    } else {
        Err(LedgerError::Codec("neither status nor target field".to_string()))
    }
}

fn decode_fields(
    added_at: DateTime<Utc>,
    raw: &HashMap<&str, &str>,
) -> Result<LinkEntry, LedgerError> {
    let mut fields: HashMap<&str, String> = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let value = urlencoding::decode(value)
            .map_err(|e| LedgerError::Codec(format!("bad encoding in {}: {}", key, e)))?;
        fields.insert(key, value.into_owned());
    }

    let required = |key: &str| -> Result<String, LedgerError> {
        fields
            .get(key)
            .cloned()
            .ok_or_else(|| LedgerError::Codec(format!("missing field {}", key)))
    };
    let number = |key: &str| -> Result<Option<u32>, LedgerError> {
        fields
            .get(key)
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|e| LedgerError::Codec(format!("bad {} {:?}: {}", key, v, e)))
            })
            .transpose()
    };

    let category: Category = required("category")?
        .parse()
        .map_err(|e| LedgerError::Codec(format!("{}", e)))?;
    let target = MediaTarget::from_parts(
        category,
        required("title")?,
        number("season")?,
        number("episode")?,
    )
    .map_err(|e| LedgerError::Codec(e.to_string()))?;
    let status: LinkStatus = required("status")?.parse().map_err(LedgerError::Codec)?;

    // Entries imported from older logs are resolved without a known URL.
    let strm_path = fields.get("strm").map(PathBuf::from);
    if status == LinkStatus::Resolved && strm_path.is_none() {
        return Err(LedgerError::Codec(
            "resolved entry without strm path".to_string(),
        ));
    }

    let expires_at = fields
        .get("expires")
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| LedgerError::Codec(format!("bad expiry {:?}: {}", v, e)))
        })
        .transpose()?;

    Ok(LinkEntry {
        raw_link: required("link")?,
        target,
        status,
        resolved_url: fields.get("url").cloned(),
        strm_path,
        filename: fields.get("filename").cloned(),
        expires_at,
        error_reason: fields.get("error").cloned(),
        added_at,
    })
}

/// Older lines were only written for links that made it onto disk, with
/// the absolute path of the `.strm` file and unescaped values.
fn decode_legacy_fields(
    added_at: DateTime<Utc>,
    raw: &HashMap<&str, &str>,
    category: Category,
) -> Result<LinkEntry, LedgerError> {
    let raw_link = raw
        .get("link")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LedgerError::Codec("missing field link".to_string()))?;
    let target_path = raw.get("target").map(|v| v.trim()).unwrap_or_default();
    let (target, strm_path) = infer_target(target_path, category)?;

    Ok(LinkEntry {
        raw_link: raw_link.to_string(),
        target,
        status: LinkStatus::Resolved,
        resolved_url: None,
        strm_path: Some(strm_path),
        filename: raw
            .get("rd_filename")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        expires_at: None,
        error_reason: None,
        added_at,
    })
}

/// Target and library-relative path from an absolute `.strm` path laid out
/// as `<root>/movies/<title>/<file>` or `<root>/tv/<show>/<season dir>/<file>`.
fn infer_target(path: &str, category: Category) -> Result<(MediaTarget, PathBuf), LedgerError> {
    let bad = |why: &str| LedgerError::Codec(format!("{} in target {:?}", why, path));

    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| bad("non-UTF-8 path"))?),
            Component::ParentDir => return Err(bad("'..'")),
            _ => {}
        }
    }

    let depth = match category {
        Category::Movie => 2,
        Category::Episode => 3,
    };
    let file = parts.last().copied().unwrap_or_default();
    if parts.len() < depth || !file.to_ascii_lowercase().ends_with(".strm") {
        return Err(bad("not a .strm path"));
    }
    let tail = &parts[parts.len() - depth..];

    let target = match category {
        Category::Movie => MediaTarget::movie(tail[0]),
        Category::Episode => {
            let stem = file.get(..file.len() - ".strm".len()).unwrap_or(file);
            let marker = SEASON_EPISODE.captures(stem).ok_or_else(|| bad("no episode marker"))?;
            let season = DIGITS
                .find(tail[1])
                .and_then(|m| m.as_str().parse().ok())
                .or_else(|| marker[1].parse().ok())
                .ok_or_else(|| bad("no season"))?;
            let episode = marker[2].parse().map_err(|_| bad("bad episode number"))?;
            MediaTarget::episode(tail[0], season, episode)
        }
    }
    .map_err(|e| bad(&e.to_string()))?;

    let mut strm_path = PathBuf::from(category.dir_name());
    strm_path.extend(tail);
    Ok((target, strm_path))
}

fn push(fields: &mut Vec<String>, key: &str, value: &str) {
    fields.push(format!("{}={}", key, urlencoding::encode(value)));
}

/// Relative path with `/` separators regardless of platform.
fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
