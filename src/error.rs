//! Error types returned by land operations and config loading.
//!
//! Every [`LandError`] is caused by caller input or current state, never by a
//! transient fault, so none of them are worth retrying.

use thiserror::Error;

pub type LandResult<T> = Result<T, LandError>;

/// Category of a [`LandError`], for callers that map errors to player messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PermissionDenied,
    InvalidOperation,
    PreconditionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandError {
    /// A referenced land, role or member does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Duplicate name, existing membership, or territory held by another land.
    #[error("{0}")]
    Conflict(String),
    /// The actor lacks the capability or hierarchy position for the action.
    #[error("{0}")]
    PermissionDenied(String),
    /// The request breaks a land rule (disconnected claim, owner protections, ...).
    #[error("{0}")]
    InvalidOperation(String),
    /// The acting player has no land or no completed wand selection.
    #[error("{0}")]
    PreconditionFailed(String),
}

impl LandError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
        }
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub(crate) fn denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    pub(crate) fn no_selection() -> Self {
        Self::precondition("No land selected for the player.")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Read(#[source] std::io::Error),
    #[error("write default config: {0}")]
    Write(#[source] std::io::Error),
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
