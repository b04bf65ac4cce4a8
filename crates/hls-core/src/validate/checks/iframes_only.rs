use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::Finding;

use super::{Check, CheckContext};

/// An I-frames-only playlist should declare its initialization section.
pub struct IFramesOnlyCheck;

impl Check for IFramesOnlyCheck {
    fn name(&self) -> &'static str {
        "IFramesOnly"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Variant
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let occurrences: Vec<u32> = ctx
            .occurrences(Tag::IFramesOnly)
            .into_iter()
            .map(|(line, _)| line)
            .collect();

        let finding = if occurrences.is_empty() {
            Finding::pass(self.name(), "not an I-frames-only playlist")
        } else if ctx.has_tag(Tag::Map) {
            Finding::pass(self.name(), "I-frames-only playlist declares EXT-X-MAP")
        } else {
            Finding::warning(
                self.name(),
                "I-frames-only playlist has no EXT-X-MAP",
                occurrences,
            )
        };
        vec![finding]
    }
}
