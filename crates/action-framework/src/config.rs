//! # Configuration Loading
//!
//! Settings files are TOML. [`load_toml`] reads and deserializes one into any
//! `serde` type; crates layer their own defaults and environment overrides on
//! top (see `platform_actor::lifecycle::Settings`).

use crate::error::FrameworkError;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Reads `path` and deserializes it as TOML.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, FrameworkError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FrameworkError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded config file");
    parse_toml(&contents)
}

/// Deserializes TOML text.
pub fn parse_toml<T: DeserializeOwned>(contents: &str) -> Result<T, FrameworkError> {
    Ok(toml::from_str(contents)?)
}
