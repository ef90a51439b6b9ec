//! Transport-level errors produced by the typed remote clients.

use thiserror::Error;

/// Failure signals the typed remote clients can report.
///
/// The action layer never shows these to the operator directly: every one of
/// them goes through [`crate::error::translate`] first.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CcError {
    /// The name is already used by a buildpack with no stack assigned.
    #[error("{message}")]
    BuildpackAlreadyExistsWithoutStack { message: String },

    /// The name and stack combination is already used. The stack name only
    /// appears in `message`.
    #[error("{message}")]
    BuildpackAlreadyExistsForStack { message: String },

    /// The buildpack name is already in use.
    #[error("{message}")]
    BuildpackNameTaken { message: String },

    /// The requested resource does not exist on the remote platform.
    #[error("{message}")]
    ResourceNotFound { message: String },

    /// Instance stats were requested for an application that is not running.
    #[error("{message}")]
    ApplicationStopped { message: String },

    /// The remote API answered with a status the client does not recognize.
    #[error("Unexpected Response\nResponse code: {status}\n{message}")]
    UnexpectedResponse { status: u16, message: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("{0}")]
    Request(String),
}

impl CcError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            message: message.into(),
        }
    }
}
