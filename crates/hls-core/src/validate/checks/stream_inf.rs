use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// `EXT-X-STREAM-INF` needs `BANDWIDTH` and a following `.m3u8` URI in a
/// Master, and is forbidden in a Variant.
pub struct StreamInfCheck;

impl Check for StreamInfCheck {
    fn name(&self) -> &'static str {
        "StreamInf"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let stream_infs = ctx.attributes(Tag::StreamInf);

        if ctx.kind == NodeKind::Variant {
            let lines = stream_infs.iter().map(|(line, _)| *line).collect();
            return vec![rule(
                self.name(),
                Severity::Error,
                lines,
                "no EXT-X-STREAM-INF in media playlist",
                "EXT-X-STREAM-INF is not allowed in a media playlist",
            )];
        }

        let missing_bandwidth = stream_infs
            .iter()
            .filter(|(_, attrs)| !attrs.contains("BANDWIDTH"))
            .map(|(line, _)| *line)
            .collect();

        let missing_uri = stream_infs
            .iter()
            .filter(|(line, _)| {
                !ctx.line(line + 1)
                    .is_some_and(|next| next.ends_with(".m3u8"))
            })
            .map(|(line, _)| *line)
            .collect();

        vec![
            rule(
                self.name(),
                Severity::Error,
                missing_bandwidth,
                "every EXT-X-STREAM-INF carries BANDWIDTH",
                "BANDWIDTH attribute missing",
            ),
            rule(
                self.name(),
                Severity::Error,
                missing_uri,
                "every EXT-X-STREAM-INF is followed by a .m3u8 URI",
                "EXT-X-STREAM-INF must be followed by a .m3u8 URI line",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::checks::testing::{run, severities};

    #[test]
    fn bandwidth_and_uri_present_passes() {
        let findings = run(
            &StreamInfCheck,
            NodeKind::Master,
            &["#EXTM3U", "#EXT-X-STREAM-INF:BANDWIDTH=1280000", "low.m3u8"],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Pass, Severity::Pass]);
    }

    #[test]
    fn missing_bandwidth_is_error() {
        let findings = run(
            &StreamInfCheck,
            NodeKind::Master,
            &["#EXTM3U", "#EXT-X-STREAM-INF:RESOLUTION=640x360", "low.m3u8"],
            0,
        );
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].message, "BANDWIDTH attribute missing");
        assert_eq!(findings[0].lines, vec![2]);
        assert!(findings[1].is_pass());
    }

    #[test]
    fn uri_must_follow_immediately() {
        let findings = run(
            &StreamInfCheck,
            NodeKind::Master,
            &[
                "#EXTM3U",
                "#EXT-X-STREAM-INF:BANDWIDTH=1",
                "",
                "low.m3u8",
                "#EXT-X-STREAM-INF:BANDWIDTH=2",
            ],
            0,
        );
        assert!(findings[0].is_pass());
        assert_eq!(findings[1].severity, Severity::Error);
        assert_eq!(findings[1].lines, vec![2, 5]);
    }

    #[test]
    fn stream_inf_in_variant_is_error() {
        let findings = run(
            &StreamInfCheck,
            NodeKind::Variant,
            &["#EXTM3U", "#EXT-X-STREAM-INF:BANDWIDTH=1", "#EXTINF:4,", "a.ts"],
            0,
        );
        assert_eq!(severities(&findings), vec![Severity::Error]);
        assert_eq!(findings[0].lines, vec![2]);
    }

    #[test]
    fn variant_without_stream_inf_passes() {
        let findings = run(&StreamInfCheck, NodeKind::Variant, &["#EXTM3U", "a.ts"], 0);
        assert_eq!(severities(&findings), vec![Severity::Pass]);
    }
}
