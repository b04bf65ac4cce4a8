use crate::playlist::tags::match_tag;
use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// Master playlists must not carry media-playlist tags and vice versa.
pub struct MixedTagsCheck;

impl Check for MixedTagsCheck {
    fn name(&self) -> &'static str {
        "MixedTags"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let foreign: fn(Tag) -> bool = match ctx.kind {
            NodeKind::Master => Tag::is_media_only,
            NodeKind::Variant => Tag::is_master_only,
        };

        let lines: Vec<u32> = ctx
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| match_tag(line).is_some_and(|(tag, _)| foreign(tag)))
            .map(|(i, _)| i as u32 + 1)
            .collect();

        let (passed, failed) = match ctx.kind {
            NodeKind::Master => (
                "no media playlist tags in master playlist",
                "master playlist contains media playlist tags",
            ),
            NodeKind::Variant => (
                "no master playlist tags in media playlist",
                "media playlist contains master playlist tags",
            ),
        };

        vec![rule(self.name(), Severity::Error, lines, passed, failed)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::{run, severities};

    #[test]
    fn master_with_segment_tags_fails() {
        let findings = run(
            &MixedTagsCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-TARGETDURATION:10",
                "#EXT-X-STREAM-INF:BANDWIDTH=1",
                "low.m3u8",
                "#EXTINF:10,",
            ],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Error]);
        assert_eq!(findings[0].lines, vec![2, 5]);
    }

    #[test]
    fn variant_with_master_tags_fails() {
        let findings = run(
            &MixedTagsCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXT-X-SESSION-KEY:METHOD=NONE", "#EXTINF:10,", "a.ts"],
            0,
        );
        assert_eq!(findings[0].lines, vec![2]);
    }

    #[test]
    fn media_sequence_is_not_mistaken_for_media() {
        let findings = run(
            &MixedTagsCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXT-X-MEDIA-SEQUENCE:0", "#EXTINF:10,", "a.ts"],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Pass]);
    }

    #[test]
    fn shared_tags_are_allowed_in_both() {
        let lines = ["#EXTM3U", "#EXT-X-VERSION:6", "#EXT-X-INDEPENDENT-SEGMENTS"];
        for kind in [NodeKind::Master, NodeKind::Variant] {
            assert!(run(&MixedTagsCheck, kind, &lines, 6)[0].is_pass());
        }
    }
}
