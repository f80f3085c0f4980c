//! Errors and their operational classification.

use std::path::PathBuf;
use thiserror::Error;

/// How an error should be treated by whoever logs it.
///
/// - Configuration: a sink or filter is missing required settings. Fixing the
///   configuration is the only remedy; the build outcome is unaffected.
/// - Transient: network, database or file system failures. Not retried by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transient,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transient => "transient",
        }
    }
}

/// Failure of one sink while publishing one report.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("sink is misconfigured: {0}")]
    Misconfigured(String),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PublishError::Misconfigured(_) => ErrorKind::Configuration,
            PublishError::Http { .. }
            | PublishError::Status { .. }
            | PublishError::Io { .. }
            | PublishError::Encode(_) => ErrorKind::Transient,
        }
    }
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Metrics(#[from] crate::metrics::RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misconfiguration_is_classified_as_configuration() {
        let err = PublishError::Misconfigured("url is empty".to_string());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("url is empty"));
    }

    #[test]
    fn io_failures_are_transient() {
        let err = PublishError::Io {
            path: PathBuf::from("/tmp/out.gexf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.to_string().contains("/tmp/out.gexf"));
    }
}
