//! Error types for the sync engine and its collaborators.

use crate::models::Role;
use crate::views::ViewId;
use thiserror::Error;

/// Coarse classification used for propagation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint unreachable or timed out.
    NetworkError,
    /// Body was not JSON (e.g. an HTML error page).
    InvalidResponse,
    /// Well-formed reply with `success: false` or an `error` field.
    BusinessError,
    /// Rejected locally before any request was made.
    Validation,
    /// Local state problem: no endpoint, no session, storage failure.
    Local,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Connection error: {0}")]
    Network(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Carries the server-provided message verbatim.
    #[error("{0}")]
    Business(String),

    #[error("{0}")]
    Validation(String),

    #[error("No API endpoint configured")]
    NotConfigured,

    #[error("No active session")]
    NoSession,

    #[error("View '{view}' is not available for role '{role}'")]
    ViewNotPermitted { view: ViewId, role: Role },

    #[error("Settings storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Network(_) => ErrorKind::NetworkError,
            SyncError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            SyncError::Business(_) => ErrorKind::BusinessError,
            SyncError::Validation(_) => ErrorKind::Validation,
            SyncError::NotConfigured
            | SyncError::NoSession
            | SyncError::ViewNotPermitted { .. }
            | SyncError::Storage(_)
            | SyncError::Io(_) => ErrorKind::Local,
        }
    }

    /// Failures of the round trip itself, as opposed to a server refusal.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkError | ErrorKind::InvalidResponse
        )
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
