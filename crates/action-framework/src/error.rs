//! # Framework Errors
//!
//! Failures raised by the framework itself rather than by the remote API:
//! acquiring an upload payload and loading configuration.

use std::path::PathBuf;

/// Errors that can occur within the action framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Unable to open {path} for upload: {source}")]
    PayloadUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Upload payload {0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("Progress reporter failed to initialize: {0}")]
    ProgressInitialize(String),
    #[error("Unable to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
