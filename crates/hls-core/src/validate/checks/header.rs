use crate::playlist::NodeKind;
use crate::validate::finding::Finding;

use super::{Check, CheckContext};

const HEADER: &str = "#EXTM3U";

/// First line of every playlist must be exactly `#EXTM3U`.
pub struct HeaderCheck;

impl Check for HeaderCheck {
    fn name(&self) -> &'static str {
        "Header"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        match ctx.lines.first() {
            Some(first) if first == HEADER => {
                vec![Finding::pass(self.name(), "first line is #EXTM3U").with_lines(vec![1])]
            }
            Some(_) => vec![Finding::error(
                self.name(),
                "first line must be #EXTM3U",
                vec![1],
            )],
            None => vec![Finding::error(
                self.name(),
                "playlist is empty, #EXTM3U header missing",
                vec![],
            )],
        }
    }
}
