//! Path planner for `.strm` files.
//!
//! Computes the library-relative location of a target using the
//! Jellyfin naming convention:
//!
//! - Movies: `movies/{title}/{title}.strm`
//! - Episodes: `tv/{title}/Season {NN}/{title} - S{NN}E{NN}.strm`
//!
//! Planning is pure: the same target always yields the same path.

mod sanitizer;

pub use sanitizer::PathSanitizer;

use std::path::PathBuf;

use crate::media::MediaTarget;

/// Extension of every planned file.
pub const STRM_EXTENSION: &str = "strm";

/// Compute the library-relative `.strm` path for a target.
pub fn plan(target: &MediaTarget) -> PathBuf {
    let title = PathSanitizer::title(target.title());
    let mut path = PathBuf::from(target.category().dir_name());
    path.push(&title);

    match target {
        MediaTarget::Movie { .. } => {
            path.push(format!("{}.{}", title, STRM_EXTENSION));
        }
        MediaTarget::Episode {
            season, episode, ..
        } => {
            path.push(season_dir(*season));
            path.push(format!(
                "{} - S{:02}E{:02}.{}",
                title, season, episode, STRM_EXTENSION
            ));
        }
    }

    path
}

/// Movie target for a link submitted without a title.
///
/// Uses the first usable name among the provider's filename and the given
/// URLs, without its video extension.
pub fn movie_named_after(filename: Option<&str>, urls: &[&str]) -> MediaTarget {
    filename
        .map(str::to_string)
        .into_iter()
        .chain(urls.iter().filter_map(|url| PathSanitizer::name_from_url(url)))
        .find_map(|name| MediaTarget::movie(PathSanitizer::strip_video_extension(&name)).ok())
        .unwrap_or_else(|| MediaTarget::Movie {
            title: PathSanitizer::EMPTY_NAME.to_string(),
        })
}

/// Format the season directory: "Season 01"
fn season_dir(season: u32) -> String {
    format!("Season {:02}", season)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_plan_movie() {
        let target = MediaTarget::movie("Arrival").unwrap();
        assert_eq!(plan(&target), Path::new("movies/Arrival/Arrival.strm"));
    }

    #[test]
    fn test_plan_episode() {
        let target = MediaTarget::episode("Foo", 1, 3).unwrap();
        assert_eq!(
            plan(&target),
            Path::new("tv/Foo/Season 01/Foo - S01E03.strm")
        );
    }

    #[test]
    fn test_plan_wide_numbers_kept() {
        let target = MediaTarget::episode("One Piece", 21, 1071).unwrap();
        assert_eq!(
            plan(&target),
            Path::new("tv/One Piece/Season 21/One Piece - S21E1071.strm")
        );
    }

    #[test]
    fn test_plan_specials_season() {
        let target = MediaTarget::episode("Foo", 0, 1).unwrap();
        assert_eq!(
            plan(&target),
            Path::new("tv/Foo/Season 00/Foo - S00E01.strm")
        );
    }

    #[test]
    fn test_plan_sanitizes_title() {
        let target = MediaTarget::movie("Mission: Impossible / Fallout.mkv").unwrap();
        assert_eq!(
            plan(&target),
            Path::new("movies/Mission Impossible Fallout/Mission Impossible Fallout.strm")
        );
    }

    #[test]
    fn test_movie_named_after() {
        assert_eq!(
            movie_named_after(Some("Arrival.2016.mkv"), &["https://cdn/x.mkv"]),
            MediaTarget::movie("Arrival.2016").unwrap()
        );
        assert_eq!(
            movie_named_after(Some("  "), &["https://cdn/dl/Heat.mp4", "https://h/d/A"]),
            MediaTarget::movie("Heat").unwrap()
        );
        assert_eq!(
            movie_named_after(None, &["https://real-debrid.com/d/ABC123"]),
            MediaTarget::movie("ABC123").unwrap()
        );
        assert_eq!(movie_named_after(None, &[]).title(), "Unnamed");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = MediaTarget::episode("Foo: Bar", 2, 5).unwrap();
        let b = MediaTarget::episode("Foo  Bar", 2, 5).unwrap();
        assert_eq!(plan(&a), plan(&a));
        assert_eq!(plan(&a), plan(&b));
    }
}
