use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::node::{MasterPlaylist, NodeKind, Playlist, PlaylistNode};
use super::tags::{classify_line, AttributeList, LineKind};
use crate::config::ValidatorConfig;
use crate::loader::{Fetched, LoadError, Locator, LocatorError, PlaylistLoader};

const PLAYLIST_EXTENSION: &str = ".m3u8";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to fetch {locator}: {source}")]
    Fetch {
        locator: Locator,
        #[source]
        source: LoadError,
    },
    #[error("invalid variant reference '{reference}' on line {line}: {source}")]
    InvalidReference {
        reference: String,
        line: u32,
        #[source]
        source: LocatorError,
    },
}

impl BuildError {
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Fetch { locator, .. } => Some(locator),
            Self::InvalidReference { .. } => None,
        }
    }
}

/// How a document is recognised as a Master playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Any line containing `.m3u8` makes the document a Master and is a
    /// variant reference. Matches the historical behaviour, including its
    /// false positives on comments or segment names.
    #[default]
    Substring,
    /// Only URI lines ending in `.m3u8` count.
    Strict,
}

/// A variant reference discovered in a Master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantReference {
    /// 1-based line number.
    pub line: u32,
    pub reference: String,
}

pub fn classify(lines: &[String], mode: ClassificationMode) -> NodeKind {
    if lines.iter().any(|line| is_reference_line(line, mode)) {
        NodeKind::Master
    } else {
        NodeKind::Variant
    }
}

/// Variant references in document order, one per matching line.
pub fn variant_references(lines: &[String], mode: ClassificationMode) -> Vec<VariantReference> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_reference_line(line, mode))
        .map(|(i, line)| VariantReference {
            line: i as u32 + 1,
            reference: reference_target(line).to_string(),
        })
        .collect()
}

fn is_reference_line(line: &str, mode: ClassificationMode) -> bool {
    match mode {
        ClassificationMode::Substring => line.contains(PLAYLIST_EXTENSION),
        ClassificationMode::Strict => {
            matches!(classify_line(line), LineKind::Uri(uri) if uri.ends_with(PLAYLIST_EXTENSION))
        }
    }
}

/// A tag line that names its playlist through a `URI` attribute refers to
/// that URI. Any other line is the reference itself.
fn reference_target(line: &str) -> &str {
    if line.starts_with('#') {
        if let Some((_, value)) = line.split_once(':') {
            if let Some(uri) = AttributeList::parse(value).get("URI") {
                if uri.contains(PLAYLIST_EXTENSION) {
                    return uri;
                }
            }
        }
    }
    line
}

/// Builds a playlist tree: the root document plus, for a Master, every
/// referenced variant.
pub struct TreeBuilder {
    loader: Arc<dyn PlaylistLoader>,
    config: ValidatorConfig,
}

impl TreeBuilder {
    pub fn new(loader: Arc<dyn PlaylistLoader>, config: ValidatorConfig) -> Self {
        Self { loader, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Fetch and classify `locator`, then fetch its variants.
    ///
    /// Variants are fetched concurrently but kept in document order. The
    /// first failure, in document order, aborts the build.
    pub async fn build(&self, locator: Locator) -> Result<PlaylistNode, BuildError> {
        let fetched = self.fetch(&locator).await?;
        self.build_from(locator, fetched).await
    }

    /// Build a tree from an already retrieved root document.
    pub async fn build_from(
        &self,
        locator: Locator,
        fetched: Fetched,
    ) -> Result<PlaylistNode, BuildError> {
        let mode = self.config.classification;
        let kind = classify(&fetched.lines, mode);
        info!(locator = %locator, %kind, lines = fetched.lines.len(), "Classified playlist");

        if kind == NodeKind::Variant {
            return Ok(PlaylistNode::Variant(Playlist::new(locator, fetched)));
        }

        let references = variant_references(&fetched.lines, mode);
        debug!(locator = %locator, variants = references.len(), "Discovered variant references");

        let variants: Vec<Playlist> = stream::iter(references)
            .map(|reference| self.build_variant(&locator, reference))
            .buffered(self.config.max_concurrent_fetches.max(1))
            .try_collect()
            .await?;

        Ok(PlaylistNode::Master(MasterPlaylist {
            playlist: Playlist::new(locator, fetched),
            variants,
        }))
    }

    async fn build_variant(
        &self,
        parent: &Locator,
        reference: VariantReference,
    ) -> Result<Playlist, BuildError> {
        let locator = parent
            .join(&reference.reference)
            .map_err(|source| BuildError::InvalidReference {
                reference: reference.reference.clone(),
                line: reference.line,
                source,
            })?;
        let fetched = self.fetch(&locator).await?;
        Ok(Playlist::new(locator, fetched))
    }

    async fn fetch(&self, locator: &Locator) -> Result<Fetched, BuildError> {
        debug!(locator = %locator, "Fetching playlist");
        self.loader
            .fetch(locator)
            .await
            .map_err(|source| BuildError::Fetch {
                locator: locator.clone(),
                source,
            })
    }
}
