use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::finding::{Finding, Severity};
use crate::playlist::{NodeKind, Playlist, PlaylistNode};

/// Findings of one playlist, with the findings of its variants nested in
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    pub locator: String,
    pub kind: NodeKind,
    pub plausible_format: bool,
    pub is_remote: bool,
    pub resolved_version: Option<u32>,
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<NodeReport>,
}

impl NodeReport {
    fn from_playlist(kind: NodeKind, playlist: &Playlist, variants: Vec<NodeReport>) -> Self {
        Self {
            locator: playlist.locator().to_string(),
            kind,
            plausible_format: playlist.plausible_format(),
            is_remote: playlist.is_remote(),
            resolved_version: playlist.resolved_version(),
            findings: playlist.findings().to_vec(),
            variants,
        }
    }

    /// This node followed by its variants.
    pub fn iter(&self) -> impl Iterator<Item = &NodeReport> + '_ {
        std::iter::once(self).chain(self.variants.iter())
    }
}

/// Finding counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    pub fn record(&mut self, finding: &Finding) {
        match finding.severity {
            Severity::Pass => self.passed += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.warnings + self.errors
    }

    pub fn merge(&mut self, other: Summary) {
        self.passed += other.passed;
        self.warnings += other.warnings;
        self.errors += other.errors;
    }
}

/// Complete result of validating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub root: NodeReport,
}

impl ValidationReport {
    pub fn from_node(node: &PlaylistNode) -> Self {
        let variants = node
            .variants()
            .iter()
            .map(|v| NodeReport::from_playlist(NodeKind::Variant, v, Vec::new()))
            .collect();
        Self {
            id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            root: NodeReport::from_playlist(node.kind(), node.playlist(), variants),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeReport> + '_ {
        self.root.iter()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for finding in self.nodes().flat_map(|n| n.findings.iter()) {
            summary.record(finding);
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.nodes()
            .flat_map(|n| n.findings.iter())
            .any(|f| f.severity == Severity::Error)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Locator;
    use crate::playlist::MasterPlaylist;
    use crate::validate::Validator;

    fn validated() -> (PlaylistNode, ValidationReport) {
        let mut node = PlaylistNode::Master(MasterPlaylist {
            playlist: Playlist::from_lines(
                Locator::parse("master.m3u8").unwrap(),
                ["#EXTM3U", "#EXT-X-STREAM-INF:RESOLUTION=640x360", "low.m3u8"],
            ),
            variants: vec![Playlist::from_lines(
                Locator::parse("low.m3u8").unwrap(),
                ["#EXTM3U", "#EXT-X-TARGETDURATION:10", "#EXTINF:9.5,", "seg0.ts"],
            )],
        });
        let report = Validator::default().validate(&mut node);
        (node, report)
    }

    #[test]
    fn report_mirrors_tree() {
        let (node, report) = validated();
        assert_eq!(report.root.kind, NodeKind::Master);
        assert_eq!(report.root.variants.len(), 1);
        assert_eq!(report.root.variants[0].locator, "low.m3u8");
        assert_eq!(report.root.findings, node.playlist().findings());
        assert_eq!(report.nodes().count(), 2);
    }

    #[test]
    fn summary_counts_every_finding() {
        let (node, report) = validated();
        let total: usize = node.nodes().map(|(_, p)| p.findings().len()).sum();
        let summary = report.summary();
        assert_eq!(summary.total(), total);
        assert!(summary.errors >= 1);
        assert!(report.has_errors());
    }

    #[test]
    fn json_round_trips_structure() {
        let (_, report) = validated();
        let json = report.to_json_pretty().unwrap();
        let parsed: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.root, report.root);
        assert!(json.contains("\"severity\": \"error\""));
        assert!(json.contains("BANDWIDTH attribute missing"));
    }

    #[test]
    fn summary_merge_adds_counts() {
        let mut a = Summary {
            passed: 1,
            warnings: 2,
            errors: 0,
        };
        a.merge(Summary {
            passed: 3,
            warnings: 0,
            errors: 1,
        });
        assert_eq!(a.total(), 7);
    }
}
