use async_trait::async_trait;
use tracing::debug;

use super::{split_lines, Fetched, LoadError, Locator, PlaylistLoader};

/// Reads playlists from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

#[async_trait]
impl PlaylistLoader for FileLoader {
    async fn fetch(&self, locator: &Locator) -> Result<Fetched, LoadError> {
        let path = match locator {
            Locator::Path(path) => path,
            Locator::Url(url) => {
                return Err(LoadError::Io {
                    path: url.to_string(),
                    reason: "not a local path".to_string(),
                })
            }
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let lines = split_lines(&text);
        debug!(path = %path.display(), lines = lines.len(), "Read playlist file");

        Ok(Fetched {
            lines,
            plausible_format: locator.has_playlist_extension(),
            is_remote: false,
        })
    }
}
