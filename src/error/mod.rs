//! Unified error handling for Mailroom Core

use crate::email::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, EmailError>;

/// Errors surfaced by email services and the service registry
///
/// Validation variants carry the exact text callers match on.
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidAttachment(String),

    #[error("File not found: {}", .0.display())]
    AttachmentNotFound(PathBuf),

    #[error("Failed to read attachment stream: {0}")]
    AttachmentRead(#[from] std::io::Error),

    #[error("No email service with the key '{0}' exists.")]
    ServiceNotFound(String),

    #[error("The email service has been disposed.")]
    Disposed,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl EmailError {
    /// Whether the failure was detected before any network I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidAttachment(_)
                | Self::AttachmentNotFound(_)
                | Self::AttachmentRead(_)
        )
    }
}
