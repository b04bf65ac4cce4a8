//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! [output]
//! log_format = "json"
//! format = "text"
//!
//! [fetch]
//! request_timeout_ms = 5000
//! max_retries = 2
//! retry_backoff_ms = 200
//! max_concurrent_fetches = 8
//!
//! [validation]
//! classification = "strict"
//! ```

use std::path::Path;

use serde::Deserialize;

use hls_core::{ClassificationMode, ValidatorConfig};

use crate::report::ReportFormat;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            format: ReportFormat::default(),
        }
    }
}

fn default_log_format() -> String {
    "pretty".into()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchConfig {
    pub request_timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub max_concurrent_fetches: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub classification: ClassificationMode,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        match self.output.log_format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "Invalid log_format '{}': must be 'pretty' or 'json'",
                    other
                ));
            }
        }

        if self.fetch.request_timeout_ms == Some(0) {
            return Err("request_timeout_ms must be greater than zero".into());
        }
        if self.fetch.max_concurrent_fetches == Some(0) {
            return Err("max_concurrent_fetches must be at least 1".into());
        }

        Ok(())
    }

    pub fn to_validator_config(&self) -> ValidatorConfig {
        let mut c = ValidatorConfig::default().with_classification(self.validation.classification);
        if let Some(ms) = self.fetch.request_timeout_ms {
            c = c.with_request_timeout(ms);
        }
        if let Some(retries) = self.fetch.max_retries {
            c = c.with_max_retries(retries);
        }
        if let Some(ms) = self.fetch.retry_backoff_ms {
            c = c.with_retry_backoff(ms);
        }
        if let Some(max) = self.fetch.max_concurrent_fetches {
            c = c.with_max_concurrent_fetches(max);
        }
        c
    }
}
