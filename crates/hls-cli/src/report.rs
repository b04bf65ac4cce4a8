//! Console and JSON rendering of validation reports.

use std::fmt::Write;

use clap::ValueEnum;
use console::{style, StyledObject};
use serde::Deserialize;

use hls_core::{Finding, NodeKind, NodeReport, Severity, Summary, ValidationReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub fn render(report: &ValidationReport, format: ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => report
            .to_json_pretty()
            .map_err(|e| format!("Failed to serialize report: {e}")),
    }
}

pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    render_node(&mut out, &report.root, 0);

    let summary = report.summary();
    writeln!(out, "{}", separator()).ok();
    writeln!(out, "{}", format_summary(&summary)).ok();
    out
}

pub fn format_summary(summary: &Summary) -> String {
    format!(
        "{} passed, {} warnings, {} errors",
        style(summary.passed).green(),
        style(summary.warnings).yellow(),
        style(summary.errors).red().bold(),
    )
}

fn render_node(out: &mut String, node: &NodeReport, depth: usize) {
    let indent = "  ".repeat(depth);
    let title = match node.kind {
        NodeKind::Master => "Master playlist",
        NodeKind::Variant => "Variant playlist",
    };
    writeln!(out, "{indent}{} {}", style(title).bold(), node.locator).ok();

    let version = node
        .resolved_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "{indent}  {} {}  {} {}  {} {}",
        style("version:").dim(),
        version,
        style("remote:").dim(),
        node.is_remote,
        style("format:").dim(),
        if node.plausible_format { "m3u8" } else { "unknown" },
    )
    .ok();

    for finding in &node.findings {
        writeln!(out, "{indent}  {}", format_finding(finding)).ok();
    }

    for variant in &node.variants {
        writeln!(out).ok();
        render_node(out, variant, depth + 1);
    }
}

fn format_finding(finding: &Finding) -> String {
    let mut line = format!(
        "{} {:<22} {}",
        severity_badge(finding.severity),
        finding.check,
        finding.message
    );
    if !finding.lines.is_empty() {
        let lines: Vec<String> = finding.lines.iter().map(u32::to_string).collect();
        write!(line, " {}", style(format!("(lines {})", lines.join(", "))).dim()).ok();
    }
    line
}

fn severity_badge(severity: Severity) -> StyledObject<String> {
    let label = format!("{:<7}", severity.to_string());
    match severity {
        Severity::Pass => style(label).green(),
        Severity::Warning => style(label).yellow().bold(),
        Severity::Error => style(label).red().bold(),
    }
}

fn separator() -> StyledObject<String> {
    style("─".repeat(56)).dim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_core::{Locator, Playlist, PlaylistNode, Validator};

    fn report() -> ValidationReport {
        let mut node = PlaylistNode::Variant(Playlist::from_lines(
            Locator::parse("media/low.m3u8").unwrap(),
            ["#EXTM3U", "#EXT-X-VERSION:3", "#EXT-X-VERSION:4", "#EXTINF:4,", "a.ts"],
        ));
        Validator::default().validate(&mut node)
    }

    #[test]
    fn text_report_lists_findings_with_lines() {
        console::set_colors_enabled(false);
        let text = render_text(&report());
        assert!(text.starts_with("Variant playlist media/low.m3u8"));
        assert!(text.contains("version: 4"));
        assert!(text.contains("ERROR   Version"));
        assert!(text.contains("(lines 2, 3)"));
        assert!(text.contains("errors"));
    }

    #[test]
    fn json_format_is_parseable() {
        let json = render(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["root"]["kind"], "variant");
        assert_eq!(value["root"]["resolved_version"], 4);
    }

    #[test]
    fn format_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: ReportFormat,
        }
        let w: Wrapper = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(w.format, ReportFormat::Json);
    }
}
