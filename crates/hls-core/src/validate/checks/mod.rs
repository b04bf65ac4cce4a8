pub mod header;
pub mod iframe;
pub mod iframes_only;
pub mod media_master;
pub mod media_sequence;
pub mod mixed_tags;
pub mod session_data;
pub mod stream_inf;
pub mod target_duration;
pub mod version;
pub mod version_compat;

use crate::playlist::tags::{tag_value, AttributeList};
use crate::playlist::{NodeKind, Tag};

use super::finding::{Finding, Severity};

/// Everything a check may read about the node it is visiting.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub kind: NodeKind,
    pub lines: &'a [String],
    /// Resolved version of this node; 0 when it declares none.
    pub version: u32,
}

impl<'a> CheckContext<'a> {
    /// 1-based line number and raw value of every occurrence of `tag`.
    pub fn occurrences(&self, tag: Tag) -> Vec<(u32, Option<&'a str>)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| tag_value(line, tag).map(|value| (i as u32 + 1, value)))
            .collect()
    }

    /// 1-based line number and parsed attribute list of every occurrence of `tag`.
    pub fn attributes(&self, tag: Tag) -> Vec<(u32, AttributeList<'a>)> {
        self.occurrences(tag)
            .into_iter()
            .map(|(line, value)| (line, AttributeList::parse(value.unwrap_or(""))))
            .collect()
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.lines.iter().any(|line| tag_value(line, tag).is_some())
    }

    /// Raw line at a 1-based line number.
    pub fn line(&self, number: u32) -> Option<&'a str> {
        let index = (number as usize).checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }
}

/// A composable playlist validation rule.
///
/// `check` runs once per node the rule applies to and returns one finding per
/// sub-rule it evaluates, Pass included.
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_to(&self, kind: NodeKind) -> bool;

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding>;

    /// Version to record on the node before `check` runs. Only the version
    /// check resolves one.
    fn resolve_version(&self, _lines: &[String]) -> Option<u32> {
        None
    }
}

/// The full rule set, in reporting order.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(header::HeaderCheck),
        Box::new(version::VersionCheck),
        Box::new(version_compat::VersionCompatibilityCheck),
        Box::new(mixed_tags::MixedTagsCheck),
        Box::new(stream_inf::StreamInfCheck),
        Box::new(iframe::IFrameCheck),
        Box::new(session_data::SessionDataCheck),
        Box::new(media_master::MediaMasterCheck),
        Box::new(target_duration::TargetDurationCheck),
        Box::new(media_sequence::MediaSequenceCheck),
        Box::new(media_sequence::DiscontinuitySequenceCheck),
        Box::new(iframes_only::IFramesOnlyCheck),
    ]
}

/// Pass when `violations` is empty, otherwise one finding of `severity`
/// carrying every violating line.
pub(crate) fn rule(
    check: &str,
    severity: Severity,
    violations: Vec<u32>,
    passed: impl Into<String>,
    failed: impl Into<String>,
) -> Finding {
    if violations.is_empty() {
        Finding::pass(check, passed)
    } else {
        Finding::new(check, severity, failed, violations)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checks_are_in_reporting_order() {
        let names: Vec<&str> = default_checks().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Header",
                "Version",
                "VersionCompatibility",
                "MixedTags",
                "StreamInf",
                "IFrame",
                "SessionData",
                "MediaMaster",
                "TargetDuration",
                "MediaSequence",
                "DiscontinuitySequence",
                "IFramesOnly",
            ]
        );
    }

    #[test]
    fn only_version_check_resolves_version() {
        let lines = vec!["#EXTM3U".to_string(), "#EXT-X-VERSION:5".to_string()];
        let resolved: Vec<Option<u32>> = default_checks()
            .iter()
            .map(|c| c.resolve_version(&lines))
            .collect();
        assert_eq!(resolved.iter().filter(|v| v.is_some()).count(), 1);
        assert_eq!(resolved[1], Some(5));
    }

    #[test]
    fn context_reports_one_based_occurrences() {
        let lines: Vec<String> = ["#EXTM3U", "#EXT-X-VERSION:3", "seg.ts", "#EXT-X-VERSION:4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ctx = CheckContext {
            kind: NodeKind::Variant,
            lines: &lines,
            version: 0,
        };
        assert_eq!(
            ctx.occurrences(Tag::Version),
            vec![(2, Some("3")), (4, Some("4"))]
        );
        assert_eq!(ctx.line(3), Some("seg.ts"));
        assert_eq!(ctx.line(0), None);
        assert!(!ctx.has_tag(Tag::Map));
    }

    #[test]
    fn rule_passes_without_violations() {
        let pass = rule("X", Severity::Error, vec![], "ok", "bad");
        assert!(pass.is_pass());
        let fail = rule("X", Severity::Warning, vec![4], "ok", "bad");
        assert_eq!(fail.severity, Severity::Warning);
        assert_eq!(fail.lines, vec![4]);
        assert_eq!(fail.message, "bad");
    }
}
