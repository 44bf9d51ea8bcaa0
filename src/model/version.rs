use serde::{Deserialize, Serialize};

/// GitLab distribution an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Community,
    Enterprise,
}

impl Edition {
    /// Trailing marker carried by identifiers of this edition, e.g. `-ce.0`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Edition::Community => "-ce.0",
            Edition::Enterprise => "-ee.0",
        }
    }

    /// Word used in the `other` field of a CPE 2.3 name.
    pub fn cpe_word(&self) -> &'static str {
        match self {
            Edition::Community => "community",
            Edition::Enterprise => "enterprise",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Edition::Community => "CE",
            Edition::Enterprise => "EE",
        }
    }
}

impl std::fmt::Display for Edition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// A knowledge base entry such as `gitlab-ce:16.5.0-ce.0`.
///
/// Ordering and equality follow the raw string, so a sorted collection of
/// identifiers is in plain lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIdentifier(String);

impl VersionIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Edition inferred from the trailing `-ce.0` / `-ee.0` marker.
    pub fn edition(&self) -> Option<Edition> {
        [Edition::Community, Edition::Enterprise]
            .into_iter()
            .find(|edition| self.0.ends_with(edition.suffix()))
    }

    /// The dotted release number with the product prefix and edition
    /// suffix removed, e.g. `16.5.0`.
    ///
    /// Returns `None` when the identifier carries no recognised edition
    /// suffix or what remains is not a dotted numeric release.
    pub fn bare_version(&self) -> Option<&str> {
        let edition = self.edition()?;
        let without_prefix = match self.0.split_once(':') {
            Some((_, rest)) => rest,
            None => self.0.as_str(),
        };
        let bare = without_prefix.strip_suffix(edition.suffix())?;
        is_numeric_version(bare).then_some(bare)
    }

    /// Parsed form of [`bare_version`](Self::bare_version).
    pub fn semver(&self) -> Option<semver::Version> {
        self.bare_version()
            .and_then(|bare| semver::Version::parse(bare).ok())
    }
}

/// Dot-separated runs of ASCII digits, e.g. `16.5` or `16.5.0`.
fn is_numeric_version(bare: &str) -> bool {
    bare.split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

impl std::fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for VersionIdentifier {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edition_from_suffix() {
        assert_eq!(
            VersionIdentifier::from("gitlab-ce:16.5.0-ce.0").edition(),
            Some(Edition::Community)
        );
        assert_eq!(
            VersionIdentifier::from("gitlab-ee:16.5.0-ee.0").edition(),
            Some(Edition::Enterprise)
        );
        assert_eq!(VersionIdentifier::from("gitlab-ce:16.5.0").edition(), None);
        assert_eq!(VersionIdentifier::from("gitlab-ce:16.5.0-ce.1").edition(), None);
    }

    #[test]
    fn test_bare_version() {
        assert_eq!(
            VersionIdentifier::from("gitlab-ce:16.5.0-ce.0").bare_version(),
            Some("16.5.0")
        );
        assert_eq!(
            VersionIdentifier::from("gitlab-ee:15.11.13-ee.0").bare_version(),
            Some("15.11.13")
        );
        // Prefix is optional
        assert_eq!(
            VersionIdentifier::from("17.0.1-ee.0").bare_version(),
            Some("17.0.1")
        );
    }

    #[test]
    fn test_bare_version_malformed() {
        assert_eq!(VersionIdentifier::from("gitlab-ce:16.5.0").bare_version(), None);
        assert_eq!(VersionIdentifier::from("gitlab-ce:latest-ce.0").bare_version(), None);
        assert_eq!(VersionIdentifier::from("").bare_version(), None);
        assert_eq!(VersionIdentifier::from("gitlab-ce:16..5-ce.0").bare_version(), None);
        assert_eq!(VersionIdentifier::from("gitlab-ce:-ce.0").bare_version(), None);
    }

    #[test]
    fn test_bare_version_two_components() {
        let id = VersionIdentifier::from("gitlab-ce:16.5-ce.0");
        assert_eq!(id.bare_version(), Some("16.5"));
        // Not a full semver, so it stays out of the version range
        assert_eq!(id.semver(), None);
    }

    #[test]
    fn test_identifier_ordering_is_lexicographic() {
        let mut ids = vec![
            VersionIdentifier::from("gitlab-ee:16.5.0-ee.0"),
            VersionIdentifier::from("gitlab-ce:16.10.0-ce.0"),
            VersionIdentifier::from("gitlab-ce:16.5.0-ce.0"),
        ];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(
            sorted,
            vec![
                "gitlab-ce:16.10.0-ce.0",
                "gitlab-ce:16.5.0-ce.0",
                "gitlab-ee:16.5.0-ee.0"
            ]
        );
    }

    #[test]
    fn test_semver() {
        let id = VersionIdentifier::from("gitlab-ce:16.5.0-ce.0");
        assert_eq!(id.semver(), Some(semver::Version::new(16, 5, 0)));
        assert_eq!(VersionIdentifier::from("gitlab-ce:16.5.0").semver(), None);
    }
}
