use async_trait::async_trait;
use reqwest::{redirect, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, info};

use super::{Page, PageFetcher};
use crate::error::FetchError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("gitlab-fingerprint/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP(S).
///
/// Redirects are not followed, so a sign-in redirect shows up as a non-200
/// status instead of silently fingerprinting another page. Invalid TLS
/// certificates are accepted since self-hosted instances often use
/// self-signed ones.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let parsed = parse_target(url)?;

        info!("Fetching: {}", url);
        let response = self.client.get(parsed).send().await.map_err(|source| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout: self.timeout,
                }
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        debug!(url, bytes = body.len(), "Fetched page");

        Ok(Page {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Validates that `url` is an absolute http(s) URL.
fn parse_target(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
