//! Typed failures shared by the gateways and the navigation core.

use thiserror::Error;

/// Chat text that is not a repository reference.
///
/// Most chat messages are unrelated text, so callers drop this silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("text is not a GitHub repository URL")]
    NotARepositoryUrl,
    #[error("repository URL has no repository name")]
    MissingRepositoryName,
}

/// A call to the repository host did not succeed.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("no branch named {0}")]
    UnknownBranch(String),
    #[error("{path} is {size} bytes, over the {limit}-byte upload limit")]
    TooLarge { path: String, size: u64, limit: u64 },
}

impl RetrievalError {
    /// Short text suitable for showing in chat
    pub fn user_message(&self) -> String {
        match self {
            RetrievalError::Status { status, .. } if status.as_u16() == 404 => {
                "repository or file not found".to_string()
            }
            RetrievalError::Status { status, .. }
                if status.as_u16() == 403 || status.as_u16() == 429 =>
            {
                "GitHub rate limit reached, try again later".to_string()
            }
            RetrievalError::Status { status, .. } => format!("GitHub returned HTTP {}", status),
            RetrievalError::Transport { source, .. } if source.is_timeout() => {
                "request to GitHub timed out".to_string()
            }
            RetrievalError::Transport { .. } => "could not reach GitHub".to_string(),
            RetrievalError::Decode { .. } => "unexpected response from GitHub".to_string(),
            RetrievalError::InvalidUrl(_) => "invalid repository path".to_string(),
            RetrievalError::UnknownBranch(branch) => format!("branch {} not found", branch),
            RetrievalError::TooLarge { limit, .. } => format!(
                "file is too large to send (limit is {} MB)",
                limit / (1024 * 1024)
            ),
        }
    }

    /// The requested object does not exist on the host
    pub fn is_not_found(&self) -> bool {
        match self {
            RetrievalError::Status { status, .. } => status.as_u16() == 404,
            RetrievalError::UnknownBranch(_) => true,
            _ => false,
        }
    }
}

/// A call to the chat platform did not succeed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to {method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} rejected: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}
