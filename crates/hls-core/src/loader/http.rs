use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use super::{split_lines, Fetched, LoadError, Locator, PlaylistLoader};

const PLAYLIST_CONTENT_TYPES: [&str; 2] = ["application/vnd.apple.mpegurl", "audio/mpegurl"];

/// HTTP-based playlist loader with connection pooling, retries, and backoff.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: Client,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpLoader {
    pub fn new(
        timeout: Duration,
        max_retries: u32,
        base_backoff: Duration,
    ) -> Result<Self, LoadError> {
        let client = Self::build_client(timeout)?;
        Ok(Self::with_client(client, max_retries, base_backoff))
    }

    pub fn with_client(client: Client, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            client,
            max_retries,
            base_backoff,
        }
    }

    pub fn from_config(config: &crate::config::ValidatorConfig) -> Result<Self, LoadError> {
        Self::new(config.request_timeout, config.max_retries, config.retry_backoff)
    }

    pub fn build_client(timeout: Duration) -> Result<Client, LoadError> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(20)
            .gzip(true)
            .build()
            .map_err(|e| LoadError::Client {
                reason: e.to_string(),
            })
    }

    async fn get(&self, uri: &str) -> Result<(String, bool), LoadError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                debug!(uri, attempt, backoff_ms = backoff.as_millis(), "Retrying playlist fetch");
                tokio::time::sleep(backoff).await;
            }

            match self.client.get(uri).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let playlist_type = response
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .map(is_playlist_content_type)
                            .unwrap_or(false);
                        match response.text().await {
                            Ok(body) => return Ok((body, playlist_type)),
                            Err(e) => {
                                last_error = Some(LoadError::Network {
                                    url: uri.to_string(),
                                    reason: e.to_string(),
                                });
                            }
                        }
                    } else {
                        let status = response.status().as_u16();
                        let message = response
                            .status()
                            .canonical_reason()
                            .unwrap_or("Unknown")
                            .to_string();
                        warn!(uri, status, attempt, "Playlist fetch returned error status");
                        let err = LoadError::Http {
                            url: uri.to_string(),
                            status,
                            message,
                        };

                        if (400..500).contains(&status) && status != 429 {
                            return Err(err);
                        }
                        last_error = Some(err);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        warn!(uri, attempt, "Playlist fetch timed out");
                        last_error = Some(LoadError::Timeout {
                            url: uri.to_string(),
                        });
                    } else {
                        warn!(uri, attempt, error = %e, "Playlist fetch network error");
                        last_error = Some(LoadError::Network {
                            url: uri.to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LoadError::Network {
            url: uri.to_string(),
            reason: "no fetch attempt was made".to_string(),
        }))
    }
}

#[async_trait]
impl PlaylistLoader for HttpLoader {
    async fn fetch(&self, locator: &Locator) -> Result<Fetched, LoadError> {
        let uri = locator.to_string();
        let (body, playlist_type) = self.get(&uri).await?;
        let lines = split_lines(&body);
        debug!(uri = %uri, lines = lines.len(), playlist_type, "Fetched playlist");

        Ok(Fetched {
            lines,
            plausible_format: locator.has_playlist_extension() || playlist_type,
            is_remote: true,
        })
    }
}

fn is_playlist_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or(value).trim();
    PLAYLIST_CONTENT_TYPES
        .iter()
        .any(|t| essence.eq_ignore_ascii_case(t))
}
