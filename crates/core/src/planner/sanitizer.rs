/// Sanitizes path components by removing filesystem-illegal characters.
///
/// Handles characters that are illegal on Windows and Unix:
/// - `< > : " / \ | ? *` and control characters
/// - trailing dots (Windows restriction)
pub struct PathSanitizer;

impl PathSanitizer {
    /// Characters that are illegal in file/directory names on Windows and Unix
    const ILLEGAL_CHARS: &'static [char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    /// Substitute for a component that sanitizes to nothing.
    pub const EMPTY_NAME: &'static str = "Unnamed";

    /// Video container extensions stripped from titles.
    const VIDEO_EXTENSIONS: &'static [&'static str] =
        &["mkv", "mp4", "avi", "m4v", "mov", "wmv", "ts", "webm"];

    /// Sanitize a single path component (file or directory name).
    pub fn sanitize(component: &str) -> String {
        let replaced: String = component
            .chars()
            .map(|c| {
                if c.is_control() || Self::ILLEGAL_CHARS.contains(&c) {
                    ' '
                } else {
                    c
                }
            })
            .collect();

        let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
        let result = collapsed.trim_end_matches(|c: char| c == '.' || c == ' ');

        if result.is_empty() {
            Self::EMPTY_NAME.to_string()
        } else {
            result.to_string()
        }
    }

    /// Strip a trailing video extension, e.g. `Arrival.mkv` -> `Arrival`.
    ///
    /// Titles are often pasted straight from a release filename.
    pub fn strip_video_extension(title: &str) -> &str {
        let trimmed = title.trim();
        if let Some((stem, ext)) = trimmed.rsplit_once('.') {
            if !stem.trim().is_empty()
                && Self::VIDEO_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            {
                return stem.trim_end();
            }
        }
        trimmed
    }

    /// Title used for folder and file names.
    pub fn title(title: &str) -> String {
        Self::sanitize(Self::strip_video_extension(title))
    }

    /// Name-like text from a URL: its last path segment, percent-decoded,
    /// else its host with dots turned into underscores.
    pub fn name_from_url(url: &str) -> Option<String> {
        let url = url.trim();
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));

        let name = match path.rsplit('/').find(|segment| !segment.is_empty()) {
            Some(segment) => urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_string()),
            None => host.replace('.', "_"),
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
