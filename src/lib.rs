pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod fingerprint;
pub mod knowledge_base;
pub mod matcher;
pub mod model;
pub mod output;

pub use config::Config;
pub use error::{ConfigError, FetchError, KnowledgeBaseError};
pub use fetcher::{HttpFetcher, Page, PageFetcher};
pub use fingerprint::Fingerprinter;
pub use knowledge_base::VersionKnowledgeBase;
pub use matcher::{ReferenceLinker, VersionMatcher};
pub use model::{
    Edition, MatchResult, Outcome, ScanResult, TargetReport, VersionIdentifier, VersionMatch,
};
