//! The CSS filename to GitLab version lookup table.
//!
//! The table is external data: a JSON object whose keys are asset
//! filenames and whose values list every release that shipped that exact
//! file. A single string value is accepted as a one-element list.
//!
//! ```json
//! {
//!   "application-abc123.css": ["gitlab-ce:16.5.0-ce.0", "gitlab-ee:16.5.0-ee.0"],
//!   "application-def456.css": "gitlab-ce:16.4.2-ce.0"
//! }
//! ```
//!
//! A directory can be given instead of a file; every `*.json` file below it
//! is loaded and the entries are merged.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::KnowledgeBaseError;
use crate::model::VersionIdentifier;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersions {
    One(String),
    Many(Vec<String>),
}

impl RawVersions {
    fn into_vec(self) -> Vec<String> {
        match self {
            RawVersions::One(v) => vec![v],
            RawVersions::Many(vs) => vs,
        }
    }
}

/// Immutable mapping from asset filename to the releases that shipped it.
#[derive(Debug, Clone, Default)]
pub struct VersionKnowledgeBase {
    entries: HashMap<String, BTreeSet<VersionIdentifier>>,
}

impl VersionKnowledgeBase {
    /// Builds a knowledge base from in-memory pairs. Repeated filenames are
    /// merged.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<VersionIdentifier>,
    {
        let mut kb = Self::default();
        for (filename, versions) in entries {
            kb.insert(filename.into(), versions.into_iter().map(Into::into));
        }
        kb
    }

    /// Parses a JSON document in the format described in the module docs.
    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let mut kb = Self::default();
        kb.merge_json(json)?;
        Ok(kb)
    }

    /// Loads a JSON file, or every `*.json` file under a directory.
    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        if path.is_dir() {
            return Self::load_dir(path);
        }

        let mut kb = Self::default();
        kb.merge_file(path)?;
        debug!(path = %path.display(), entries = kb.len(), "Loaded knowledge base");
        Ok(kb)
    }

    fn load_dir(dir: &Path) -> Result<Self, KnowledgeBaseError> {
        let mut kb = Self::default();
        let mut shards = 0;

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| KnowledgeBaseError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_json = path.extension().map(|e| e == "json").unwrap_or(false);
            if !entry.file_type().is_file() || !is_json {
                continue;
            }

            kb.merge_file(path)?;
            shards += 1;
        }

        if shards == 0 {
            return Err(KnowledgeBaseError::EmptyDirectory(dir.to_path_buf()));
        }

        debug!(
            path = %dir.display(),
            shards,
            entries = kb.len(),
            "Loaded knowledge base directory"
        );
        Ok(kb)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), KnowledgeBaseError> {
        let content = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json(&content).map_err(|e| match e {
            KnowledgeBaseError::ParseStr(source) => KnowledgeBaseError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    fn merge_json(&mut self, json: &str) -> Result<(), KnowledgeBaseError> {
        let raw: HashMap<String, RawVersions> = serde_json::from_str(json)?;
        for (filename, versions) in raw {
            self.insert(
                filename,
                versions.into_vec().into_iter().map(VersionIdentifier::from),
            );
        }
        Ok(())
    }

    fn insert(&mut self, filename: String, versions: impl Iterator<Item = VersionIdentifier>) {
        self.entries.entry(filename).or_default().extend(versions);
    }

    /// Releases that shipped `filename`, if it is known.
    pub fn lookup(&self, filename: &str) -> Option<&BTreeSet<VersionIdentifier>> {
        self.entries.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    /// Number of known filenames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every distinct identifier in the table, sorted.
    pub fn versions(&self) -> BTreeSet<&VersionIdentifier> {
        self.entries.values().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "application-abc123.css": ["gitlab-ce:16.5.0-ce.0", "gitlab-ee:16.5.0-ee.0"],
        "application-def456.css": "gitlab-ce:16.4.2-ce.0"
    }"#;

    #[test]
    fn test_from_json_str() {
        let kb = VersionKnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert_eq!(kb.len(), 2);

        let versions = kb.lookup("application-abc123.css").unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions.contains(&VersionIdentifier::from("gitlab-ee:16.5.0-ee.0")));

        let single = kb.lookup("application-def456.css").unwrap();
        assert_eq!(single.len(), 1);
        assert!(kb.lookup("application-000000.css").is_none());
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(matches!(
            VersionKnowledgeBase::from_json_str("[1, 2, 3]"),
            Err(KnowledgeBaseError::ParseStr(_))
        ));
        assert!(VersionKnowledgeBase::from_json_str(r#"{"a.css": 5}"#).is_err());
    }

    #[test]
    fn test_from_entries_merges_duplicates() {
        let kb = VersionKnowledgeBase::from_entries([
            ("application-abc123.css", vec!["gitlab-ce:16.5.0-ce.0"]),
            ("application-abc123.css", vec!["gitlab-ee:16.5.0-ee.0", "gitlab-ce:16.5.0-ce.0"]),
        ]);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.lookup("application-abc123.css").unwrap().len(), 2);
    }

    #[test]
    fn test_versions_are_distinct() {
        let kb = VersionKnowledgeBase::from_entries([
            ("a.css", vec!["gitlab-ce:16.5.0-ce.0"]),
            ("b.css", vec!["gitlab-ce:16.5.0-ce.0", "gitlab-ce:16.5.1-ce.0"]),
        ]);
        let versions: Vec<&str> = kb.versions().into_iter().map(|v| v.as_str()).collect();
        assert_eq!(versions, vec!["gitlab-ce:16.5.0-ce.0", "gitlab-ce:16.5.1-ce.0"]);
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("css_versions.json");
        fs::write(&path, SAMPLE).unwrap();

        let kb = VersionKnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = VersionKnowledgeBase::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(KnowledgeBaseError::Read { .. })));
    }

    #[test]
    fn test_load_invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        match VersionKnowledgeBase::load(&path) {
            Err(KnowledgeBaseError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other.map(|kb| kb.len())),
        }
    }

    #[test]
    fn test_load_directory_merges_shards() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("16.x");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("15.json"),
            r#"{"application-aaa.css": ["gitlab-ce:15.11.0-ce.0"]}"#,
        )
        .unwrap();
        fs::write(
            nested.join("16.json"),
            r#"{"application-aaa.css": ["gitlab-ee:15.11.0-ee.0"], "application-bbb.css": "gitlab-ce:16.0.0-ce.0"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a shard").unwrap();

        let kb = VersionKnowledgeBase::load(dir.path()).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.lookup("application-aaa.css").unwrap().len(), 2);
        assert!(kb.contains("application-bbb.css"));
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            VersionKnowledgeBase::load(dir.path()),
            Err(KnowledgeBaseError::EmptyDirectory(_))
        ));
    }
}
