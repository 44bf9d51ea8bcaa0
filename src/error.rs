use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading the CSS-to-version knowledge base.
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("Failed to read knowledge base {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid knowledge base {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid knowledge base: {0}")]
    ParseStr(#[from] serde_json::Error),

    #[error("Failed to walk knowledge base directory {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No knowledge base files (*.json) found under {0:?}")]
    EmptyDirectory(PathBuf),
}

/// Transport failures while fetching the target page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Error requesting {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Got HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
