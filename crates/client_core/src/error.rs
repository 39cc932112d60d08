use std::{fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("record has no id")]
    MissingId,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Failure of a list fetch. The controller stores its `Display` text.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("page size {0} is not one of 10, 30, 50")]
    InvalidPageSize(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

#[derive(Debug, Error)]
#[error("{kind} {resource} failed: {source}")]
pub struct MutationError {
    pub kind: MutationKind,
    pub resource: &'static str,
    #[source]
    pub source: ApiError,
}
