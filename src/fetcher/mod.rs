//! Page retrieval.
//!
//! The [`PageFetcher`] trait is the seam between the fingerprinting core
//! and the network. [`HttpFetcher`] is the real implementation; tests swap
//! in canned pages.

mod http;

pub use http::{HttpFetcher, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

use async_trait::async_trait;

use crate::error::FetchError;

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Retrieves the markup of a single target URL.
///
/// Implementations report anything other than an HTTP 200 response as an
/// error, so a returned [`Page`] is always safe to extract from.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Human-readable name of the transport.
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}
