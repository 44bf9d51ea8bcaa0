//! Core data types for version identifiers and fingerprint results.
//!
//! - [`VersionIdentifier`] - A knowledge base entry such as `gitlab-ce:16.5.0-ce.0`
//! - [`Edition`] - Community or Enterprise
//! - [`MatchResult`] - What matched for one page
//! - [`TargetReport`] - Per-target outcome, including fetch failures
//! - [`ScanResult`] - Complete scan results
//!
//! # Example
//!
//! ```
//! use gitlab_fingerprint::{Edition, VersionIdentifier};
//!
//! let id = VersionIdentifier::from("gitlab-ee:16.5.0-ee.0");
//! assert_eq!(id.edition(), Some(Edition::Enterprise));
//! assert_eq!(id.bare_version(), Some("16.5.0"));
//! ```

mod result;
mod version;

pub use result::*;
pub use version::*;
