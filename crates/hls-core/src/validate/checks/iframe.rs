use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// Every `EXT-X-I-FRAME-STREAM-INF` must carry `BANDWIDTH` and `URI`.
pub struct IFrameCheck;

impl Check for IFrameCheck {
    fn name(&self) -> &'static str {
        "IFrame"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Master
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let tags = ctx.attributes(Tag::IFrameStreamInf);
        let missing = |name: &str| -> Vec<u32> {
            tags.iter()
                .filter(|(_, attrs)| !attrs.contains(name))
                .map(|(line, _)| *line)
                .collect()
        };

        vec![
            rule(
                self.name(),
                Severity::Error,
                missing("BANDWIDTH"),
                "every EXT-X-I-FRAME-STREAM-INF carries BANDWIDTH",
                "EXT-X-I-FRAME-STREAM-INF BANDWIDTH attribute missing",
            ),
            rule(
                self.name(),
                Severity::Error,
                missing("URI"),
                "every EXT-X-I-FRAME-STREAM-INF carries URI",
                "EXT-X-I-FRAME-STREAM-INF URI attribute missing",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::{run, severities};

    #[test]
    fn complete_iframe_stream_passes() {
        let findings = run(
            &IFrameCheck,
            NodeKind::Master,
            &["#EXTM3U", "#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=86000,URI=\"iframe.m3u8\""],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Pass, Severity::Pass]);
    }

    #[test]
    fn each_missing_attribute_is_reported_separately() {
        let findings = run(
            &IFrameCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-I-FRAME-STREAM-INF:URI=\"a.m3u8\"",
                "#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=1",
                "#EXT-X-I-FRAME-STREAM-INF:CODECS=\"avc1\"",
            ],
            0,
        );
        assert_eq!(findings[0].lines, vec![2, 4]);
        assert_eq!(findings[1].lines, vec![3, 4]);
    }

    #[test]
    fn only_applies_to_master() {
        assert!(IFrameCheck.applies_to(NodeKind::Master));
        assert!(!IFrameCheck.applies_to(NodeKind::Variant));
    }
}
