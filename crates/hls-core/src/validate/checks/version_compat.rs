use crate::playlist::tags::extinf_duration;
use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// Features whose use requires a minimum protocol version, or that a
/// version forbids.
pub struct VersionCompatibilityCheck;

impl VersionCompatibilityCheck {
    fn master(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let service = if ctx.version < 7 {
            ctx.attributes(Tag::Media)
                .into_iter()
                .filter(|(_, attrs)| {
                    attrs
                        .get("INSTREAM-ID")
                        .is_some_and(|id| id.contains("SERVICE"))
                })
                .map(|(line, _)| line)
                .collect()
        } else {
            Vec::new()
        };

        let program_id = if ctx.version < 6 {
            let mut lines: Vec<u32> = ctx
                .attributes(Tag::StreamInf)
                .into_iter()
                .chain(ctx.attributes(Tag::IFrameStreamInf))
                .filter(|(_, attrs)| attrs.contains("PROGRAM-ID"))
                .map(|(line, _)| line)
                .collect();
            lines.sort_unstable();
            lines
        } else {
            Vec::new()
        };

        vec![
            rule(
                self.name(),
                Severity::Error,
                service,
                "INSTREAM-ID SERVICE values compatible with version",
                "EXT-X-MEDIA INSTREAM-ID SERVICE value requires version 7 or higher",
            ),
            rule(
                self.name(),
                Severity::Warning,
                program_id,
                "PROGRAM-ID usage compatible with version",
                "PROGRAM-ID attribute requires version 6 or higher",
            ),
            self.allow_cache(ctx),
        ]
    }

    fn variant(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let below = |min: u32| ctx.version < min;
        let occurrences = |tag: Tag| -> Vec<u32> {
            ctx.occurrences(tag).into_iter().map(|(line, _)| line).collect()
        };

        let iv = if below(2) {
            ctx.attributes(Tag::Key)
                .into_iter()
                .filter(|(_, attrs)| attrs.contains("IV"))
                .map(|(line, _)| line)
                .collect()
        } else {
            Vec::new()
        };

        let fractional = if below(3) {
            ctx.occurrences(Tag::Inf)
                .into_iter()
                .filter(|(_, value)| extinf_duration(value.unwrap_or("")).contains('.'))
                .map(|(line, _)| line)
                .collect()
        } else {
            Vec::new()
        };

        let byterange = if below(4) {
            let mut lines = occurrences(Tag::ByteRange);
            lines.extend(occurrences(Tag::IFramesOnly));
            lines.sort_unstable();
            lines
        } else {
            Vec::new()
        };

        let iframes_only = ctx.has_tag(Tag::IFramesOnly);
        let map_with_iframes = if iframes_only && below(5) {
            occurrences(Tag::Map)
        } else {
            Vec::new()
        };
        let map_without_iframes = if !iframes_only && below(6) {
            occurrences(Tag::Map)
        } else {
            Vec::new()
        };

        vec![
            rule(
                self.name(),
                Severity::Error,
                iv,
                "EXT-X-KEY IV usage compatible with version",
                "EXT-X-KEY IV attribute requires version 2 or higher",
            ),
            rule(
                self.name(),
                Severity::Error,
                fractional,
                "EXTINF durations compatible with version",
                "fractional EXTINF duration requires version 3 or higher",
            ),
            rule(
                self.name(),
                Severity::Error,
                byterange,
                "EXT-X-BYTERANGE and EXT-X-I-FRAMES-ONLY usage compatible with version",
                "EXT-X-BYTERANGE or EXT-X-I-FRAMES-ONLY requires version 4 or higher",
            ),
            rule(
                self.name(),
                Severity::Error,
                map_with_iframes,
                "EXT-X-MAP in I-frames-only playlist compatible with version",
                "EXT-X-MAP in an I-frames-only playlist requires version 5 or higher",
            ),
            rule(
                self.name(),
                Severity::Error,
                map_without_iframes,
                "EXT-X-MAP usage compatible with version",
                "EXT-X-MAP outside an I-frames-only playlist requires version 6 or higher",
            ),
            self.allow_cache(ctx),
        ]
    }

    fn allow_cache(&self, ctx: &CheckContext<'_>) -> Finding {
        let lines = if ctx.version >= 7 {
            ctx.occurrences(Tag::AllowCache)
                .into_iter()
                .map(|(line, _)| line)
                .collect()
        } else {
            Vec::new()
        };
        rule(
            self.name(),
            Severity::Error,
            lines,
            "EXT-X-ALLOW-CACHE usage compatible with version",
            "EXT-X-ALLOW-CACHE is not allowed in version 7 or higher",
        )
    }
}

impl Check for VersionCompatibilityCheck {
    fn name(&self) -> &'static str {
        "VersionCompatibility"
    }

    fn applies_to(&self, _kind: NodeKind) -> bool {
        true
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        match ctx.kind {
            NodeKind::Master => self.master(ctx),
            NodeKind::Variant => self.variant(ctx),
        }
    }
}
