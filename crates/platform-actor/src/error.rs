//! # Action Errors
//!
//! The closed set of failures an action can hand back to the command layer,
//! and [`translate`], the single place transport errors become action errors.

use crate::clients::CcError;
use action_framework::FrameworkError;
use thiserror::Error;
use tracing::debug;

/// Domain-level failure returned by every action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Buildpack {0} already exists without a stack")]
    AlreadyExistsWithoutStack(String),

    /// Carries the platform's own text: it is the only place the conflicting
    /// stack name is reported.
    #[error("{message}")]
    AlreadyExistsForStack { message: String },

    #[error("Buildpack name {0} is already taken")]
    NameTaken(String),

    #[error("{resource} {name} not found")]
    NotFound { resource: &'static str, name: String },

    #[error("{0}")]
    Opaque(String),
}

impl ActionError {
    pub fn app_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "App",
            name: name.into(),
        }
    }
}

/// Progress collaborator failures happen before any remote call, so they skip
/// [`translate`] and surface with their own message.
impl From<FrameworkError> for ActionError {
    fn from(error: FrameworkError) -> Self {
        ActionError::Opaque(error.to_string())
    }
}

/// Maps a transport error onto the action taxonomy.
///
/// `subject` is the resource name (or GUID) the failing call was about; it is
/// what the name-carrying kinds report.
pub fn translate(error: CcError, subject: &str) -> ActionError {
    let translated = match error {
        CcError::BuildpackAlreadyExistsWithoutStack { .. } => {
            ActionError::AlreadyExistsWithoutStack(subject.to_string())
        }
        CcError::BuildpackAlreadyExistsForStack { message } => {
            ActionError::AlreadyExistsForStack { message }
        }
        CcError::BuildpackNameTaken { .. } => ActionError::NameTaken(subject.to_string()),
        e @ (CcError::ResourceNotFound { .. }
        | CcError::ApplicationStopped { .. }
        | CcError::UnexpectedResponse { .. }
        | CcError::Request(_)) => ActionError::Opaque(e.to_string()),
    };
    debug!(subject, error = ?translated, "Translated transport error");
    translated
}
