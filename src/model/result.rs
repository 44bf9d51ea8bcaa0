use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Edition, VersionIdentifier};

/// One matched identifier together with its derived reference link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMatch {
    pub identifier: VersionIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

/// How a single fingerprinting run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one known version matched.
    Matched,
    /// CSS candidates were found but none is in the knowledge base.
    NoMatch,
    /// The page referenced no qualifying CSS assets.
    NoCandidates,
    /// The page could not be fetched.
    Unavailable,
}

impl Outcome {
    pub fn describe(&self) -> &'static str {
        match self {
            Outcome::Matched => "GitLab version identified",
            Outcome::NoMatch => "No known GitLab CSS hash matched",
            Outcome::NoCandidates => "No target CSS files found in page",
            Outcome::Unavailable => "Page unavailable",
        }
    }
}

/// Result of matching the CSS assets of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Unique candidate filenames in first-seen order.
    pub candidates: Vec<String>,
    /// Candidates that look like the main `application-*.css` bundle.
    pub application_bundles: Vec<String>,
    /// Candidates that were found in the knowledge base.
    pub matched_assets: Vec<String>,
    /// Matched identifiers, unique and sorted ascending.
    pub versions: Vec<VersionMatch>,
}

impl MatchResult {
    pub fn outcome(&self) -> Outcome {
        if self.candidates.is_empty() {
            Outcome::NoCandidates
        } else if self.versions.is_empty() {
            Outcome::NoMatch
        } else {
            Outcome::Matched
        }
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &VersionIdentifier> {
        self.versions.iter().map(|v| &v.identifier)
    }

    /// Lowest and highest release among the matches that parse as semver.
    pub fn version_range(&self) -> Option<(semver::Version, semver::Version)> {
        let mut parsed: Vec<semver::Version> =
            self.identifiers().filter_map(|id| id.semver()).collect();
        parsed.sort();
        let low = parsed.first()?.clone();
        let high = parsed.last()?.clone();
        Some((low, high))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    Unavailable { reason: String },
    Fingerprinted { result: MatchResult },
}

/// Everything learned about one target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: String,
    #[serde(flatten)]
    pub status: TargetStatus,
}

impl TargetReport {
    pub fn unavailable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: TargetStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn fingerprinted(target: impl Into<String>, result: MatchResult) -> Self {
        Self {
            target: target.into(),
            status: TargetStatus::Fingerprinted { result },
        }
    }

    pub fn outcome(&self) -> Outcome {
        match &self.status {
            TargetStatus::Unavailable { .. } => Outcome::Unavailable,
            TargetStatus::Fingerprinted { result } => result.outcome(),
        }
    }

    pub fn result(&self) -> Option<&MatchResult> {
        match &self.status {
            TargetStatus::Fingerprinted { result } => Some(result),
            TargetStatus::Unavailable { .. } => None,
        }
    }
}

/// Results of a whole `scan` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_time: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
}

impl ScanResult {
    pub fn new(targets: Vec<TargetReport>) -> Self {
        Self {
            scan_time: Utc::now(),
            targets,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.targets
            .iter()
            .filter(|t| t.outcome() == outcome)
            .count()
    }

    pub fn all_matched(&self) -> bool {
        self.targets.iter().all(|t| t.outcome() == Outcome::Matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(raw: &str) -> VersionMatch {
        let identifier = VersionIdentifier::from(raw);
        VersionMatch {
            edition: identifier.edition(),
            identifier,
            reference_url: None,
        }
    }

    #[test]
    fn test_outcome_no_candidates() {
        let result = MatchResult::default();
        assert_eq!(result.outcome(), Outcome::NoCandidates);
    }

    #[test]
    fn test_outcome_no_match() {
        let result = MatchResult {
            candidates: vec!["application-abc.css".to_string()],
            ..Default::default()
        };
        assert_eq!(result.outcome(), Outcome::NoMatch);
    }

    #[test]
    fn test_outcome_matched() {
        let result = MatchResult {
            candidates: vec!["application-abc.css".to_string()],
            matched_assets: vec!["application-abc.css".to_string()],
            versions: vec![version("gitlab-ce:16.5.0-ce.0")],
            ..Default::default()
        };
        assert_eq!(result.outcome(), Outcome::Matched);
    }

    #[test]
    fn test_version_range_skips_malformed() {
        let result = MatchResult {
            candidates: vec!["a.css".to_string()],
            versions: vec![
                version("gitlab-ce:16.10.1-ce.0"),
                version("gitlab-ce:16.5.0"),
                version("gitlab-ee:16.9.2-ee.0"),
            ],
            ..Default::default()
        };
        let (low, high) = result.version_range().unwrap();
        assert_eq!(low, semver::Version::new(16, 9, 2));
        assert_eq!(high, semver::Version::new(16, 10, 1));
    }

    #[test]
    fn test_version_range_none_when_nothing_parses() {
        let result = MatchResult {
            versions: vec![version("gitlab-ce:16.5.0")],
            ..Default::default()
        };
        assert!(result.version_range().is_none());
    }

    #[test]
    fn test_target_report_outcome() {
        let report = TargetReport::unavailable("https://gitlab.example.com", "HTTP 404");
        assert_eq!(report.outcome(), Outcome::Unavailable);
        assert!(report.result().is_none());

        let report = TargetReport::fingerprinted("https://gitlab.example.com", MatchResult::default());
        assert_eq!(report.outcome(), Outcome::NoCandidates);
    }

    #[test]
    fn test_target_report_serializes_status_tag() {
        let report = TargetReport::unavailable("https://gitlab.example.com", "HTTP 302");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["reason"], "HTTP 302");
        assert_eq!(json["target"], "https://gitlab.example.com");
    }

    #[test]
    fn test_scan_result_counts() {
        let result = ScanResult::new(vec![
            TargetReport::unavailable("a", "timeout"),
            TargetReport::fingerprinted("b", MatchResult::default()),
        ]);
        assert_eq!(result.count(Outcome::Unavailable), 1);
        assert_eq!(result.count(Outcome::NoCandidates), 1);
        assert_eq!(result.count(Outcome::Matched), 0);
        assert!(!result.all_matched());
    }
}
