use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Pass,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// One outcome of one rule evaluated against one playlist.
///
/// `lines` holds 1-based line numbers into the owning playlist and is empty
/// when the outcome is not tied to specific lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub check: String,
    pub severity: Severity,
    pub message: String,
    pub lines: Vec<u32>,
}

impl Finding {
    pub fn new(
        check: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        lines: Vec<u32>,
    ) -> Self {
        Self {
            check: check.into(),
            severity,
            message: message.into(),
            lines,
        }
    }

    pub fn pass(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Pass, message, Vec::new())
    }

    pub fn warning(check: impl Into<String>, message: impl Into<String>, lines: Vec<u32>) -> Self {
        Self::new(check, Severity::Warning, message, lines)
    }

    pub fn error(check: impl Into<String>, message: impl Into<String>, lines: Vec<u32>) -> Self {
        Self::new(check, Severity::Error, message, lines)
    }

    pub fn with_lines(mut self, lines: Vec<u32>) -> Self {
        self.lines = lines;
        self
    }

    pub fn is_pass(&self) -> bool {
        self.severity == Severity::Pass
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.check, self.message)?;
        if !self.lines.is_empty() {
            let lines: Vec<String> = self.lines.iter().map(u32::to_string).collect();
            write!(f, " (lines {})", lines.join(", "))?;
        }
        Ok(())
    }
}
