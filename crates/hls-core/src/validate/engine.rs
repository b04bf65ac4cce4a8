use tracing::{debug, info};

use super::checks::version::resolve_version;
use super::checks::{default_checks, Check, CheckContext};
use super::report::ValidationReport;
use crate::playlist::PlaylistNode;

/// Runs an ordered set of checks over a playlist tree.
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(default_checks())
    }
}

impl Validator {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    /// Validate `node` and every variant under it.
    ///
    /// Each check visits the root, then each variant in document order.
    /// Findings from a previous run are discarded, so validating the same
    /// tree twice yields the same findings.
    pub fn validate(&self, node: &mut PlaylistNode) -> ValidationReport {
        {
            let mut nodes = node.nodes_mut();
            for (_, playlist) in nodes.iter_mut() {
                playlist.begin_run();
            }

            for check in &self.checks {
                for (kind, playlist) in nodes.iter_mut() {
                    if !check.applies_to(*kind) {
                        continue;
                    }
                    if let Some(version) = check.resolve_version(playlist.lines()) {
                        playlist.set_resolved_version(version);
                    }
                    let version = playlist
                        .resolved_version()
                        .unwrap_or_else(|| resolve_version(playlist.lines()).value);

                    let findings = check.check(&CheckContext {
                        kind: *kind,
                        lines: playlist.lines(),
                        version,
                    });
                    debug!(
                        check = check.name(),
                        locator = %playlist.locator(),
                        findings = findings.len(),
                        "Check complete"
                    );
                    playlist.append_findings(findings);
                }
            }
        }

        let report = ValidationReport::from_node(node);
        let summary = report.summary();
        info!(
            locator = %node.playlist().locator(),
            variants = node.variants().len(),
            passed = summary.passed,
            warnings = summary.warnings,
            errors = summary.errors,
            "Validation complete"
        );
        report
    }
}
