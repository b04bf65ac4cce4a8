use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("empty playlist reference")]
    Empty,
    #[error("invalid URL '{reference}': {reason}")]
    InvalidUrl { reference: String, reason: String },
    #[error("'{reference}' is a comment or tag, not a playlist reference")]
    NotAReference { reference: String },
    #[error("unsupported URL scheme '{scheme}' in '{reference}'")]
    UnsupportedScheme { reference: String, scheme: String },
}

/// Where a playlist's content comes from: a local path or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Path(PathBuf),
    Url(Url),
}

impl Locator {
    /// `http://` and `https://` references become URLs, anything else is a path.
    pub fn parse(reference: &str) -> Result<Self, LocatorError> {
        if reference.is_empty() {
            return Err(LocatorError::Empty);
        }
        if is_http(reference) {
            let url = Url::parse(reference).map_err(|e| LocatorError::InvalidUrl {
                reference: reference.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Self::Url(url));
        }
        Ok(Self::Path(PathBuf::from(reference)))
    }

    /// Resolve a reference found inside this playlist.
    ///
    /// Absolute HTTP(S) references stand alone. Relative references are
    /// joined against the parent URL, or against the parent file's directory.
    /// A reference starting with `#` would only set a fragment on the parent
    /// and is rejected.
    pub fn join(&self, reference: &str) -> Result<Self, LocatorError> {
        if reference.is_empty() {
            return Err(LocatorError::Empty);
        }
        if reference.starts_with('#') {
            return Err(LocatorError::NotAReference {
                reference: reference.to_string(),
            });
        }
        if is_http(reference) {
            return Self::parse(reference);
        }
        match self {
            Self::Url(base) => {
                let url = base.join(reference).map_err(|e| LocatorError::InvalidUrl {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                })?;
                match url.scheme() {
                    "http" | "https" => Ok(Self::Url(url)),
                    other => Err(LocatorError::UnsupportedScheme {
                        reference: reference.to_string(),
                        scheme: other.to_string(),
                    }),
                }
            }
            Self::Path(parent) => {
                let child = Path::new(reference);
                if child.is_absolute() {
                    return Ok(Self::Path(child.to_path_buf()));
                }
                let dir = parent.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::Path(dir.join(child)))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Whether the path (query string excluded) ends in `.m3u8` or `.m3u`.
    pub fn has_playlist_extension(&self) -> bool {
        match self {
            Self::Url(url) => has_playlist_extension(url.path()),
            Self::Path(path) => path.to_str().map(has_playlist_extension).unwrap_or(false),
        }
    }

    /// Last path component without its extension, used to name per-document outputs.
    pub fn file_stem(&self) -> Option<String> {
        match self {
            Self::Url(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|s| !s.is_empty())
                .map(Path::new)
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .map(str::to_string),
            Self::Path(path) => path.file_stem().and_then(|s| s.to_str()).map(str::to_string),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_http(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

fn has_playlist_extension(path: &str) -> bool {
    path.ends_with(".m3u8") || path.ends_with(".m3u")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urls_and_paths() {
        let remote = Locator::parse("https://cdn.example.com/live/master.m3u8").unwrap();
        assert!(remote.is_remote());
        let local = Locator::parse("playlists/master.m3u8").unwrap();
        assert!(!local.is_remote());
        assert_eq!(local.to_string(), "playlists/master.m3u8");
    }

    #[test]
    fn rejects_empty_reference() {
        assert_eq!(Locator::parse(""), Err(LocatorError::Empty));
    }

    #[test]
    fn rejects_malformed_url() {
        let err = Locator::parse("http://").unwrap_err();
        assert!(matches!(err, LocatorError::InvalidUrl { .. }));
    }

    #[test]
    fn joins_relative_reference_to_url() {
        let master = Locator::parse("https://cdn.example.com/live/master.m3u8").unwrap();
        let child = master.join("level_0/index.m3u8").unwrap();
        assert_eq!(
            child.to_string(),
            "https://cdn.example.com/live/level_0/index.m3u8"
        );
        let rooted = master.join("/other/low.m3u8").unwrap();
        assert_eq!(rooted.to_string(), "https://cdn.example.com/other/low.m3u8");
    }

    #[test]
    fn joins_relative_reference_to_path() {
        let master = Locator::parse("fixtures/vod/master.m3u8").unwrap();
        let child = master.join("low.m3u8").unwrap();
        assert_eq!(child, Locator::Path(PathBuf::from("fixtures/vod/low.m3u8")));

        let bare = Locator::parse("master.m3u8").unwrap();
        assert_eq!(
            bare.join("low.m3u8").unwrap(),
            Locator::Path(PathBuf::from("low.m3u8"))
        );
    }

    #[test]
    fn comment_line_is_not_joined() {
        let master = Locator::parse("https://cdn.example.com/live/master.m3u8").unwrap();
        assert_eq!(
            master.join("# see backup.m3u8"),
            Err(LocatorError::NotAReference {
                reference: "# see backup.m3u8".to_string()
            })
        );
        let local = Locator::parse("fixtures/master.m3u8").unwrap();
        assert!(matches!(
            local.join("#EXT-X-MEDIA:TYPE=AUDIO,NAME=\"a.m3u8\""),
            Err(LocatorError::NotAReference { .. })
        ));
    }

    #[test]
    fn absolute_http_reference_ignores_parent() {
        let master = Locator::parse("fixtures/master.m3u8").unwrap();
        let child = master.join("http://other.example.com/a.m3u8").unwrap();
        assert!(child.is_remote());
    }

    #[test]
    fn playlist_extension_ignores_query() {
        let url = Locator::parse("https://cdn.example.com/a.m3u8?token=abc").unwrap();
        assert!(url.has_playlist_extension());
        assert!(Locator::parse("list.m3u").unwrap().has_playlist_extension());
        assert!(!Locator::parse("batch.txt").unwrap().has_playlist_extension());
    }

    #[test]
    fn file_stem_for_both_kinds() {
        let url = Locator::parse("https://cdn.example.com/live/master.m3u8").unwrap();
        assert_eq!(url.file_stem().as_deref(), Some("master"));
        let path = Locator::parse("dir/low.m3u8").unwrap();
        assert_eq!(path.file_stem().as_deref(), Some("low"));
    }
}
