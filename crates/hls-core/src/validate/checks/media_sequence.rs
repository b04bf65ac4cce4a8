use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

const SEGMENT_SUFFIX: &str = ".ts";

/// Optional sequence-number tag that must precede the first segment and
/// appear at most once.
fn sequence_findings(check: &str, tag: Tag, ctx: &CheckContext<'_>) -> Vec<Finding> {
    let occurrences = ctx.occurrences(tag);
    if occurrences.is_empty() {
        return vec![Finding::pass(check, format!("{tag} not present"))];
    }

    let first_segment = ctx
        .lines
        .iter()
        .position(|line| line.ends_with(SEGMENT_SUFFIX))
        .map(|i| i as u32 + 1);

    let late = occurrences
        .iter()
        .filter(|(line, _)| first_segment.is_some_and(|segment| *line > segment))
        .map(|(line, _)| *line)
        .collect();

    let lines: Vec<u32> = occurrences.iter().map(|(line, _)| *line).collect();
    let repeated = if lines.len() > 1 { lines } else { Vec::new() };

    let malformed: Vec<u32> = occurrences
        .iter()
        .filter(|(_, value)| value.and_then(|v| v.parse::<u64>().ok()).is_none())
        .map(|(line, _)| *line)
        .collect();

    let mut findings = vec![
        rule(
            check,
            Severity::Error,
            late,
            format!("{tag} appears before the first media segment"),
            format!("{tag} must appear before the first media segment"),
        ),
        rule(
            check,
            Severity::Error,
            repeated,
            format!("{tag} appears once"),
            format!("{tag} appears more than once"),
        ),
    ];
    if !malformed.is_empty() {
        findings.push(Finding::error(
            check,
            format!("{tag} value is not an integer"),
            malformed,
        ));
    }
    findings
}

pub struct MediaSequenceCheck;

impl Check for MediaSequenceCheck {
    fn name(&self) -> &'static str {
        "MediaSequence"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Variant
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        sequence_findings(self.name(), Tag::MediaSequence, ctx)
    }
}

pub struct DiscontinuitySequenceCheck;

impl Check for DiscontinuitySequenceCheck {
    fn name(&self) -> &'static str {
        "DiscontinuitySequence"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Variant
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        sequence_findings(self.name(), Tag::DiscontinuitySequence, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::{run, severities};

    #[test]
    fn absent_tag_is_single_pass() {
        let findings = run(&MediaSequenceCheck, NodeKind::Variant, &["#EXTM3U", "a.ts"], 0);
        assert_eq!(severities(&findings), vec![Severity::Pass]);
    }

    #[test]
    fn tag_before_first_segment_passes() {
        let findings = run(
            &MediaSequenceCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXT-X-MEDIA-SEQUENCE:7", "#EXTINF:4,", "a.ts"],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Pass, Severity::Pass]);
    }

    #[test]
    fn late_and_repeated_tags_fail() {
        let findings = run(
            &MediaSequenceCheck,
            NodeKind::Variant,
            &[
                "#EXTM3U",
                "#EXT-X-MEDIA-SEQUENCE:1",
                "#EXTINF:4,",
                "a.ts",
                "#EXT-X-MEDIA-SEQUENCE:2",
            ],
            0,
        );
        assert_eq!(findings[0].lines, vec![5]);
        assert_eq!(findings[1].lines, vec![2, 5]);
    }

    #[test]
    fn discontinuity_sequence_shares_the_rule() {
        let findings = run(
            &DiscontinuitySequenceCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXTINF:4,", "a.ts", "#EXT-X-DISCONTINUITY-SEQUENCE:x"],
            0,
        );
        assert_eq!(
            severities(&findings),
            vec![Severity::Error, Severity::Pass, Severity::Error]
        );
        assert_eq!(findings[0].check, "DiscontinuitySequence");
        assert_eq!(findings[2].lines, vec![4]);
    }

    #[test]
    fn discontinuity_sequence_does_not_match_discontinuity() {
        let findings = run(
            &DiscontinuitySequenceCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXTINF:4,", "a.ts", "#EXT-X-DISCONTINUITY", "b.ts"],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Pass]);
    }
}
