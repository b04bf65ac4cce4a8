use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::playlist::ClassificationMode;

/// Configuration for building and validating playlist trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// HTTP request timeout for playlist fetches.
    pub request_timeout: Duration,
    /// Maximum number of retries for failed playlist fetches.
    pub max_retries: u32,
    /// Base backoff duration for retries (doubled each attempt).
    pub retry_backoff: Duration,
    /// Number of variant playlists fetched concurrently under one Master.
    pub max_concurrent_fetches: usize,
    /// How a document is recognised as a Master playlist.
    pub classification: ClassificationMode,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            max_concurrent_fetches: 4,
            classification: ClassificationMode::Substring,
        }
    }
}

impl ValidatorConfig {
    pub fn with_request_timeout(mut self, ms: u64) -> Self {
        self.request_timeout = Duration::from_millis(ms);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, ms: u64) -> Self {
        self.retry_backoff = Duration::from_millis(ms);
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    pub fn with_classification(mut self, mode: ClassificationMode) -> Self {
        self.classification = mode;
        self
    }
}
