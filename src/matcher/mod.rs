//! Matching extracted CSS filenames against the knowledge base.
//!
//! Every unique filename is looked up and the releases of all hits are
//! unioned. The resulting set is reported in lexicographic order, each
//! identifier paired with a CPE reference link when one can be derived.
//!
//! # Example
//!
//! ```
//! use gitlab_fingerprint::{Outcome, VersionKnowledgeBase, VersionMatcher};
//!
//! let kb = VersionKnowledgeBase::from_entries([(
//!     "application-abc123.css",
//!     vec!["gitlab-ce:16.5.0-ce.0", "gitlab-ee:16.5.0-ee.0"],
//! )]);
//! let matcher = VersionMatcher::new(&kb);
//!
//! let result = matcher.match_filenames(&["application-abc123.css"]);
//! assert_eq!(result.outcome(), Outcome::Matched);
//! assert_eq!(result.versions.len(), 2);
//! ```

mod reference;

pub use reference::{
    ReferenceLinker, DEFAULT_CPE_PRODUCT, DEFAULT_CPE_VENDOR, DEFAULT_REFERENCE_HOST,
};

use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

use crate::knowledge_base::VersionKnowledgeBase;
use crate::model::{MatchResult, VersionIdentifier, VersionMatch};

/// Marker of GitLab's main stylesheet bundle.
const APPLICATION_BUNDLE_MARKER: &str = "application-";

pub struct VersionMatcher<'kb> {
    kb: &'kb VersionKnowledgeBase,
    linker: ReferenceLinker,
}

impl<'kb> VersionMatcher<'kb> {
    pub fn new(kb: &'kb VersionKnowledgeBase) -> Self {
        Self {
            kb,
            linker: ReferenceLinker::default(),
        }
    }

    pub fn with_linker(mut self, linker: ReferenceLinker) -> Self {
        self.linker = linker;
        self
    }

    /// Looks up every unique filename and aggregates the matched releases.
    ///
    /// Filenames flagged as `application-*` bundles are only reported; all
    /// candidates take part in matching.
    pub fn match_filenames<S: AsRef<str>>(&self, filenames: &[S]) -> MatchResult {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut result = MatchResult::default();
        let mut matched: BTreeSet<&VersionIdentifier> = BTreeSet::new();

        for filename in filenames.iter().map(AsRef::as_ref) {
            if !seen.insert(filename) {
                continue;
            }
            result.candidates.push(filename.to_string());

            if is_application_bundle(filename) {
                info!("    └── {}", filename);
                result.application_bundles.push(filename.to_string());
            }

            if let Some(versions) = self.kb.lookup(filename) {
                info!(css = filename, versions = versions.len(), "Matched CSS");
                result.matched_assets.push(filename.to_string());
                matched.extend(versions);
            } else {
                debug!(css = filename, "Unknown CSS asset");
            }
        }

        result.versions = matched
            .into_iter()
            .map(|identifier| VersionMatch {
                identifier: identifier.clone(),
                edition: identifier.edition(),
                reference_url: self.linker.link(identifier),
            })
            .collect();

        result
    }
}

fn is_application_bundle(filename: &str) -> bool {
    filename.contains(APPLICATION_BUNDLE_MARKER)
}
