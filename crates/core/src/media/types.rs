use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building a media target from user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("Title must not be blank")]
    BlankTitle,

    #[error("Episode number must be at least 1")]
    InvalidEpisode,

    #[error("Season and episode are required for episodes")]
    MissingEpisodeInfo,

    #[error("Movies do not carry season or episode numbers")]
    UnexpectedEpisodeInfo,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Library category a link is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movie,
    Episode,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Movie, Category::Episode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::Episode => "episode",
        }
    }

    /// Directory name used under both the media root and the log root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Movie => "movies",
            Category::Episode => "tv",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TargetError;

    /// Accepts both the category names and the on-disk directory names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Category::Movie),
            "episode" | "episodes" | "tv" => Ok(Category::Episode),
            other => Err(TargetError::UnknownCategory(other.to_string())),
        }
    }
}

/// Where a link is materialized in the library.
///
/// Episodes always carry a season and an episode number; movies never do.
/// Deserialization goes through the same checks as the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case", try_from = "UncheckedTarget")]
pub enum MediaTarget {
    Movie {
        title: String,
    },
    Episode {
        title: String,
        season: u32,
        episode: u32,
    },
}

impl MediaTarget {
    /// Creates a movie target.
    pub fn movie(title: impl Into<String>) -> Result<Self, TargetError> {
        Ok(Self::Movie {
            title: checked_title(title.into())?,
        })
    }

    /// Creates an episode target. Season 0 (specials) is allowed.
    pub fn episode(title: impl Into<String>, season: u32, episode: u32) -> Result<Self, TargetError> {
        if episode == 0 {
            return Err(TargetError::InvalidEpisode);
        }
        Ok(Self::Episode {
            title: checked_title(title.into())?,
            season,
            episode,
        })
    }

    /// Builds a target from loose parts, as they arrive from a form or a log line.
    pub fn from_parts(
        category: Category,
        title: impl Into<String>,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Self, TargetError> {
        match (category, season, episode) {
            (Category::Movie, None, None) => Self::movie(title),
            (Category::Movie, _, _) => Err(TargetError::UnexpectedEpisodeInfo),
            (Category::Episode, Some(season), Some(episode)) => {
                Self::episode(title, season, episode)
            }
            (Category::Episode, _, _) => Err(TargetError::MissingEpisodeInfo),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            MediaTarget::Movie { .. } => Category::Movie,
            MediaTarget::Episode { .. } => Category::Episode,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaTarget::Movie { title } | MediaTarget::Episode { title, .. } => title,
        }
    }

    pub fn season(&self) -> Option<u32> {
        match self {
            MediaTarget::Movie { .. } => None,
            MediaTarget::Episode { season, .. } => Some(*season),
        }
    }

    pub fn episode_number(&self) -> Option<u32> {
        match self {
            MediaTarget::Movie { .. } => None,
            MediaTarget::Episode { episode, .. } => Some(*episode),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
enum UncheckedTarget {
    Movie {
        title: String,
    },
    Episode {
        title: String,
        season: u32,
        episode: u32,
    },
}

impl TryFrom<UncheckedTarget> for MediaTarget {
    type Error = TargetError;

    fn try_from(raw: UncheckedTarget) -> Result<Self, Self::Error> {
        match raw {
            UncheckedTarget::Movie { title } => Self::movie(title),
            UncheckedTarget::Episode {
                title,
                season,
                episode,
            } => Self::episode(title, season, episode),
        }
    }
}

impl fmt::Display for MediaTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTarget::Movie { title } => write!(f, "{}", title),
            MediaTarget::Episode {
                title,
                season,
                episode,
            } => write!(f, "{} S{:02}E{:02}", title, season, episode),
        }
    }
}

fn checked_title(title: String) -> Result<String, TargetError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TargetError::BlankTitle);
    }
    Ok(trimmed.to_string())
}
