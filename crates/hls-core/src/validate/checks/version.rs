use crate::playlist::tags::tag_value;
use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::Finding;

use super::{Check, CheckContext};

/// Outcome of scanning a node for `EXT-X-VERSION`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionResolution {
    /// Value of the last occurrence, 0 when there is none.
    pub value: u32,
    /// 1-based lines of every occurrence.
    pub occurrences: Vec<u32>,
    /// Occurrences whose value is not an unsigned integer. They count as 0.
    pub malformed: Vec<u32>,
}

pub fn resolve_version(lines: &[String]) -> VersionResolution {
    let mut resolution = VersionResolution::default();
    for (i, line) in lines.iter().enumerate() {
        let Some(value) = tag_value(line, Tag::Version) else {
            continue;
        };
        let number = i as u32 + 1;
        resolution.occurrences.push(number);
        resolution.value = match value.and_then(|v| v.parse::<u32>().ok()) {
            Some(v) => v,
            None => {
                resolution.malformed.push(number);
                0
            }
        };
    }
    resolution
}

/// Resolves and reports the protocol version of each node independently.
pub struct VersionCheck;

impl Check for VersionCheck {
    fn name(&self) -> &'static str {
        "Version"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn resolve_version(&self, lines: &[String]) -> Option<u32> {
        Some(resolve_version(lines).value)
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let resolution = resolve_version(ctx.lines);
        let mut findings = Vec::with_capacity(2);

        match resolution.occurrences.len() {
            0 => findings.push(Finding::pass(
                self.name(),
                "no EXT-X-VERSION tag, version 0",
            )),
            1 => findings.push(
                Finding::pass(
                    self.name(),
                    format!("EXT-X-VERSION {}", resolution.value),
                )
                .with_lines(resolution.occurrences.clone()),
            ),
            n => findings.push(Finding::error(
                self.name(),
                format!(
                    "multiple EXT-X-VERSION tags ({n}), using last value {}",
                    resolution.value
                ),
                resolution.occurrences.clone(),
            )),
        }

        if !resolution.malformed.is_empty() {
            findings.push(Finding::error(
                self.name(),
                "EXT-X-VERSION value is not an integer",
                resolution.malformed,
            ));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::{run, severities};
    use crate::validate::Severity;

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn absent_version_resolves_to_zero() {
        let r = resolve_version(&owned(&["#EXTM3U", "seg.ts"]));
        assert_eq!(r.value, 0);
        assert!(r.occurrences.is_empty());
    }

    #[test]
    fn last_occurrence_wins() {
        let r = resolve_version(&owned(&["#EXTM3U", "#EXT-X-VERSION:3", "#EXT-X-VERSION:4"]));
        assert_eq!(r.value, 4);
        assert_eq!(r.occurrences, vec![2, 3]);
    }

    #[test]
    fn multiple_versions_emit_single_error_with_all_lines() {
        let findings = run(
            &VersionCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXT-X-VERSION:3", "#EXT-X-VERSION:4"],
            4,
        );
        assert_eq!(severities(&findings), vec![Severity::Error]);
        assert_eq!(findings[0].lines, vec![2, 3]);
    }

    #[test]
    fn single_version_passes() {
        let findings = run(&VersionCheck, NodeKind::Master, &["#EXTM3U", "#EXT-X-VERSION:7"], 7);
        assert_eq!(severities(&findings), vec![Severity::Pass]);
        assert_eq!(findings[0].lines, vec![2]);
    }

    #[test]
    fn malformed_version_is_reported() {
        let lines = ["#EXTM3U", "#EXT-X-VERSION:three"];
        assert_eq!(resolve_version(&owned(&lines)).value, 0);
        let findings = run(&VersionCheck, NodeKind::Variant, &lines, 0);
        assert_eq!(severities(&findings), vec![Severity::Pass, Severity::Error]);
        assert_eq!(findings[1].lines, vec![2]);
    }

    #[test]
    fn version_prefix_does_not_match_longer_tags() {
        let r = resolve_version(&owned(&["#EXTM3U", "#EXT-X-VERSIONX:9"]));
        assert_eq!(r.value, 0);
    }
}
