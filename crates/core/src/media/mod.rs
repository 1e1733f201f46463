//! Media targets.
//!
//! A [`MediaTarget`] says where a link belongs in the Jellyfin library: a
//! movie by title, or an episode by show title, season and episode number.

mod types;

pub use types::{Category, MediaTarget, TargetError};
