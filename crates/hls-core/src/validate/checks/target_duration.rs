use crate::playlist::tags::extinf_duration;
use crate::playlist::{NodeKind, Tag};
use crate::validate::finding::{Finding, Severity};

use super::{rule, Check, CheckContext};

/// `EXT-X-TARGETDURATION` must appear exactly once and bound every segment
/// duration.
pub struct TargetDurationCheck;

fn parse_duration(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

impl Check for TargetDurationCheck {
    fn name(&self) -> &'static str {
        "TargetDuration"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Variant
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Finding> {
        let targets = ctx.occurrences(Tag::TargetDuration);
        let mut findings = Vec::with_capacity(5);

        findings.push(if targets.is_empty() {
            Finding::error(self.name(), "EXT-X-TARGETDURATION tag missing", vec![])
        } else {
            Finding::pass(self.name(), "EXT-X-TARGETDURATION tag present")
        });

        let lines: Vec<u32> = targets.iter().map(|(line, _)| *line).collect();
        findings.push(rule(
            self.name(),
            Severity::Error,
            if lines.len() > 1 { lines } else { Vec::new() },
            "EXT-X-TARGETDURATION appears once",
            "EXT-X-TARGETDURATION appears more than once",
        ));

        let mut malformed_targets = Vec::new();
        let mut target = None;
        for (line, value) in &targets {
            match value.and_then(|v| v.parse::<u64>().ok()) {
                Some(t) => {
                    target.get_or_insert(t);
                }
                None => malformed_targets.push(*line),
            }
        }
        if !malformed_targets.is_empty() {
            findings.push(Finding::error(
                self.name(),
                "EXT-X-TARGETDURATION value is not an integer",
                malformed_targets,
            ));
        }

        let Some(target) = target else {
            return findings;
        };

        let mut exceeding = Vec::new();
        let mut malformed_durations = Vec::new();
        for (line, value) in ctx.occurrences(Tag::Inf) {
            match parse_duration(extinf_duration(value.unwrap_or(""))) {
                Some(duration) if duration > target as f64 => exceeding.push(line),
                Some(_) => {}
                None => malformed_durations.push(line),
            }
        }

        findings.push(rule(
            self.name(),
            Severity::Error,
            exceeding,
            format!("every EXTINF duration is within the target duration of {target}"),
            format!("EXTINF duration exceeds the target duration of {target}"),
        ));
        if !malformed_durations.is_empty() {
            findings.push(Finding::error(
                self.name(),
                "EXTINF duration is not a number",
                malformed_durations,
            ));
        }

        findings
    }
}
