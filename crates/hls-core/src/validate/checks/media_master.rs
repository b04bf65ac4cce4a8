use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// Tags allowed in both playlist kinds: `EXT-X-INDEPENDENT-SEGMENTS` and
/// `EXT-X-START`.
pub struct MediaMasterCheck;

impl Check for MediaMasterCheck {
    fn name(&self) -> &'static str {
        "MediaMaster"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let repeated = |tag: Tag| -> Vec<u32> {
            let lines: Vec<u32> = ctx.occurrences(tag).into_iter().map(|(l, _)| l).collect();
            if lines.len() > 1 {
                lines
            } else {
                Vec::new()
            }
        };

        let starts = ctx.attributes(Tag::Start);
        let missing_offset = starts
            .iter()
            .filter(|(_, attrs)| !attrs.contains("TIME-OFFSET"))
            .map(|(line, _)| *line)
            .collect();

        vec![
            rule(
                self.name(),
                Severity::Error,
                repeated(Tag::IndependentSegments),
                "EXT-X-INDEPENDENT-SEGMENTS appears at most once",
                "EXT-X-INDEPENDENT-SEGMENTS appears more than once",
            ),
            rule(
                self.name(),
                Severity::Error,
                repeated(Tag::Start),
                "EXT-X-START appears at most once",
                "EXT-X-START appears more than once",
            ),
            rule(
                self.name(),
                Severity::Error,
                missing_offset,
                "every EXT-X-START carries TIME-OFFSET",
                "EXT-X-START TIME-OFFSET attribute missing",
            ),
        ]
    }
}
