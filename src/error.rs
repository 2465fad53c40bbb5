use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single backend request.
///
/// These never escape the request coordinator: they are recorded as the
/// `error` field of the derived view and the session stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchError {
    #[error("search request failed: {reason}")]
    Transport { status: Option<u16>, reason: String },

    #[error("malformed search response: {reason}")]
    Malformed { reason: String },
}

impl SearchError {
    pub fn transport(reason: impl Into<String>) -> Self {
        SearchError::Transport {
            status: None,
            reason: reason.into(),
        }
    }

    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        SearchError::Transport {
            status: Some(status),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        SearchError::Malformed {
            reason: reason.into(),
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Transport {
                status: Some(status),
                reason,
            } => format!("Search failed (HTTP {status}): {reason}"),
            SearchError::Transport { status: None, reason } => {
                format!("Search service unavailable: {reason}")
            }
            SearchError::Malformed { reason } => {
                format!("Search service returned an unexpected response: {reason}")
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("invalid facet filter '{0}', expected category=value (query, page and page_size are reserved)")]
    InvalidFacet(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Failed to load catalog '{path}': {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
