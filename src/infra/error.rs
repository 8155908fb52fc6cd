use std::{io, path::PathBuf};

use thiserror::Error;

/// Typed outcome of a failed collaborator lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request timed out")]
    Timeout,
    #[error("{what} not found")]
    NotFound { what: &'static str },
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("http transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LookupError {
    pub fn not_found(what: &'static str) -> Self {
        LookupError::NotFound { what }
    }

    /// Whether repeating the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Timeout | LookupError::Transport(_) => true,
            LookupError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LookupError::Timeout
        } else if let Some(status) = error.status() {
            LookupError::Status(status.as_u16())
        } else if error.is_decode() {
            LookupError::Decode(error.to_string())
        } else {
            LookupError::Transport(error)
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(error: serde_json::Error) -> Self {
        LookupError::Decode(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_outcomes() {
        assert!(LookupError::Timeout.is_retryable());
        assert!(LookupError::Status(503).is_retryable());
        assert!(LookupError::Status(429).is_retryable());
        assert!(!LookupError::Status(404).is_retryable());
        assert!(!LookupError::not_found("address").is_retryable());
        assert!(!LookupError::Decode("bad".into()).is_retryable());
    }

    #[test]
    fn not_found_names_the_lookup() {
        let error = LookupError::not_found("zoning");
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "zoning not found");
    }
}
