//! Failure modeling for calls against the remote board store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{operation} failed to reach the board store: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} rejected by the board store with status {status}")]
    Status { operation: &'static str, status: u16 },
    #[error("{operation} returned a malformed payload: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl StoreError {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { .. } => "configure",
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }

    /// HTTP status of a rejected request. Only used for logs: every failure
    /// is handled the same way.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_connect() || source.is_timeout())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
