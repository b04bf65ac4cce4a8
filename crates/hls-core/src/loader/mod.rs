mod file;
mod http;
mod locator;

pub use file::FileLoader;
pub use http::HttpLoader;
pub use locator::{Locator, LocatorError};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error {status} fetching {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    #[error("Network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("Timeout fetching {url}")]
    Timeout { url: String },
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Failed to build HTTP client: {reason}")]
    Client { reason: String },
}

impl LoadError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Raw content of one playlist document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub lines: Vec<String>,
    /// Extension or content type suggests an HLS playlist.
    pub plausible_format: bool,
    pub is_remote: bool,
}

/// Trait for retrieving playlist documents.
///
/// Implementations own transport concerns (retries, timeouts, file access)
/// and hand back the document split into lines.
#[async_trait]
pub trait PlaylistLoader: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<Fetched, LoadError>;
}

/// Split document text on newline boundaries.
///
/// `\r\n` counts as one boundary. A trailing empty line is kept.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Dispatches to the HTTP or file loader by locator kind.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    http: HttpLoader,
    file: FileLoader,
}

impl SourceLoader {
    pub fn new(http: HttpLoader) -> Self {
        Self {
            http,
            file: FileLoader,
        }
    }

    pub fn from_config(config: &crate::config::ValidatorConfig) -> Result<Self, LoadError> {
        Ok(Self::new(HttpLoader::from_config(config)?))
    }
}

#[async_trait]
impl PlaylistLoader for SourceLoader {
    async fn fetch(&self, locator: &Locator) -> Result<Fetched, LoadError> {
        match locator {
            Locator::Url(_) => self.http.fetch(locator).await,
            Locator::Path(_) => self.file.fetch(locator).await,
        }
    }
}
