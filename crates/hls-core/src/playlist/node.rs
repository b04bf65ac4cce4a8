use std::fmt;

use serde::{Deserialize, Serialize};

use crate::loader::{Fetched, Locator};
use crate::validate::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Master,
    Variant,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "Master"),
            Self::Variant => write!(f, "Variant"),
        }
    }
}

/// Content and validation state of a single playlist document.
///
/// `lines` is fixed at construction. `findings` is written only by the
/// validator, one sequence per run.
#[derive(Debug, Clone)]
pub struct Playlist {
    locator: Locator,
    plausible_format: bool,
    is_remote: bool,
    lines: Vec<String>,
    resolved_version: Option<u32>,
    findings: Vec<Finding>,
}

impl Playlist {
    pub fn new(locator: Locator, fetched: Fetched) -> Self {
        Self {
            locator,
            plausible_format: fetched.plausible_format,
            is_remote: fetched.is_remote,
            lines: fetched.lines,
            resolved_version: None,
            findings: Vec::new(),
        }
    }

    /// Playlist built from in-memory lines, e.g. for tests or piped input.
    pub fn from_lines<I, S>(locator: Locator, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let plausible_format = locator.has_playlist_extension();
        let is_remote = locator.is_remote();
        Self::new(
            locator,
            Fetched {
                lines: lines.into_iter().map(Into::into).collect(),
                plausible_format,
                is_remote,
            },
        )
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn plausible_format(&self) -> bool {
        self.plausible_format
    }

    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `None` until the version check has run; `Some(0)` means no version tag.
    pub fn resolved_version(&self) -> Option<u32> {
        self.resolved_version
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub(crate) fn set_resolved_version(&mut self, version: u32) {
        self.resolved_version = Some(version);
    }

    pub(crate) fn begin_run(&mut self) {
        self.findings = Vec::new();
    }

    pub(crate) fn append_findings(&mut self, findings: Vec<Finding>) {
        self.findings.extend(findings);
    }
}

#[derive(Debug, Clone)]
pub struct MasterPlaylist {
    pub playlist: Playlist,
    /// One entry per variant reference, in document order.
    pub variants: Vec<Playlist>,
}

/// Root of a validated document tree. Variants are always leaves.
#[derive(Debug, Clone)]
pub enum PlaylistNode {
    Master(MasterPlaylist),
    Variant(Playlist),
}

impl PlaylistNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Master(_) => NodeKind::Master,
            Self::Variant(_) => NodeKind::Variant,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        match self {
            Self::Master(master) => &master.playlist,
            Self::Variant(playlist) => playlist,
        }
    }

    pub fn variants(&self) -> &[Playlist] {
        match self {
            Self::Master(master) => &master.variants,
            Self::Variant(_) => &[],
        }
    }

    /// Root first, then each variant in document order, with its kind.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKind, &Playlist)> + '_ {
        std::iter::once((self.kind(), self.playlist()))
            .chain(self.variants().iter().map(|v| (NodeKind::Variant, v)))
    }

    pub(crate) fn nodes_mut(&mut self) -> Vec<(NodeKind, &mut Playlist)> {
        match self {
            Self::Master(master) => std::iter::once((NodeKind::Master, &mut master.playlist))
                .chain(master.variants.iter_mut().map(|v| (NodeKind::Variant, v)))
                .collect(),
            Self::Variant(playlist) => vec![(NodeKind::Variant, playlist)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(name: &str, lines: &[&str]) -> Playlist {
        Playlist::from_lines(Locator::parse(name).unwrap(), lines.iter().copied())
    }

    #[test]
    fn from_lines_derives_flags_from_locator() {
        let p = playlist("https://cdn.example.com/low.m3u8", &["#EXTM3U"]);
        assert!(p.plausible_format());
        assert!(p.is_remote());
        assert_eq!(p.resolved_version(), None);
        assert!(p.findings().is_empty());
    }

    #[test]
    fn nodes_visits_root_then_variants_in_order() {
        let node = PlaylistNode::Master(MasterPlaylist {
            playlist: playlist("master.m3u8", &["#EXTM3U", "a.m3u8", "b.m3u8"]),
            variants: vec![playlist("a.m3u8", &["#EXTM3U"]), playlist("b.m3u8", &["#EXTM3U"])],
        });
        let visited: Vec<(NodeKind, String)> = node
            .nodes()
            .map(|(kind, p)| (kind, p.locator().to_string()))
            .collect();
        assert_eq!(
            visited,
            vec![
                (NodeKind::Master, "master.m3u8".to_string()),
                (NodeKind::Variant, "a.m3u8".to_string()),
                (NodeKind::Variant, "b.m3u8".to_string()),
            ]
        );
    }

    #[test]
    fn standalone_variant_has_no_children() {
        let node = PlaylistNode::Variant(playlist("low.m3u8", &["#EXTM3U"]));
        assert_eq!(node.kind(), NodeKind::Variant);
        assert!(node.variants().is_empty());
        assert_eq!(node.nodes().count(), 1);
    }
}
