//! Fetch, extract, and match for one or more targets.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::extractor::extract_css_filenames;
use crate::fetcher::PageFetcher;
use crate::matcher::VersionMatcher;
use crate::model::{MatchResult, Outcome, TargetReport};

/// Default number of targets fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 8;

pub struct Fingerprinter<'kb, F> {
    fetcher: F,
    matcher: VersionMatcher<'kb>,
}

impl<'kb, F: PageFetcher> Fingerprinter<'kb, F> {
    pub fn new(fetcher: F, matcher: VersionMatcher<'kb>) -> Self {
        Self { fetcher, matcher }
    }

    /// Fingerprints markup that was obtained elsewhere.
    pub fn fingerprint_markup(&self, markup: &str) -> MatchResult {
        let filenames = extract_css_filenames(markup);
        if filenames.is_empty() {
            info!("No target CSS files found in page.");
        } else {
            info!("Found target CSS file(s) in page.");
        }

        let result = self.matcher.match_filenames(&filenames);
        match result.outcome() {
            Outcome::Matched => {
                for id in result.identifiers() {
                    info!("GitLab Version: {}", id);
                }
            }
            Outcome::NoMatch => info!("No known GitLab CSS hash matched."),
            _ => {}
        }
        result
    }

    /// Fetches `url` and fingerprints the returned page.
    ///
    /// Transport failures are recorded in the report; extraction is not
    /// attempted for them.
    pub async fn fingerprint(&self, url: &str) -> TargetReport {
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                debug!(url, status = page.status, bytes = page.body.len(), "Page fetched");
                TargetReport::fingerprinted(url, self.fingerprint_markup(&page.body))
            }
            Err(e) => {
                warn!("{}", e);
                TargetReport::unavailable(url, e.to_string())
            }
        }
    }

    /// Fingerprints every target, returning reports in input order.
    ///
    /// At most `concurrency` targets are in flight at once; `0` or `1`
    /// fetches them one after another. `on_done` is called as each target
    /// finishes.
    pub async fn fingerprint_all<S, P>(
        &self,
        urls: &[S],
        concurrency: usize,
        on_done: P,
    ) -> Vec<TargetReport>
    where
        S: AsRef<str>,
        P: Fn(&TargetReport),
    {
        let on_done = &on_done;
        stream::iter(urls)
            .map(|url| async move {
                let report = self.fingerprint(url.as_ref()).await;
                on_done(&report);
                report
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
