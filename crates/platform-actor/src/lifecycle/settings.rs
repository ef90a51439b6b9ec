//! Settings and API version negotiation.
//!
//! ```toml
//! [api]
//! version = "3.30.0"            # reported by the target at session start
//! min_modern_version = "3.27.0" # first version whose modern endpoints are used
//!
//! [logging]
//! filter = "platform_actor=debug"
//! ```

use action_framework::config;
use action_framework::FrameworkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Overrides `[api] version`.
pub const API_VERSION_ENV: &str = "PLATFORM_ACTOR_API_VERSION";

pub const DEFAULT_MIN_MODERN_VERSION: &str = "3.27.0";

fn default_min_modern_version() -> String {
    DEFAULT_MIN_MODERN_VERSION.to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Framework(#[from] FrameworkError),

    #[error("Invalid API version {0:?}: expected major.minor.patch")]
    InvalidVersion(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Version the target reported. Unset means only the legacy API is assumed.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_min_modern_version")]
    pub min_modern_version: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            version: None,
            min_modern_version: default_min_modern_version(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        Ok(config::parse_toml(contents)?)
    }

    /// Reads `path` and applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = config::load_toml(path)?;
        Ok(settings.with_env_overrides())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_api_version_override(std::env::var(API_VERSION_ENV).ok())
    }

    fn with_api_version_override(mut self, version: Option<String>) -> Self {
        if let Some(version) = version.filter(|v| !v.trim().is_empty()) {
            debug!(%version, "API version overridden from environment");
            self.api.version = Some(version);
        }
        self
    }

    /// Which protocol generation is authoritative for this target.
    pub fn capability(&self) -> Result<ApiCapability, SettingsError> {
        let minimum: ApiVersion = self.api.min_modern_version.parse()?;
        match &self.api.version {
            Some(version) => Ok(ApiCapability::from_versions(&version.parse()?, &minimum)),
            None => Ok(ApiCapability::Legacy),
        }
    }
}

/// A `major.minor.patch` API version. Missing trailing parts read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidVersion(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for piece in trimmed.split('.') {
            if count == parts.len() {
                return Err(invalid());
            }
            parts[count] = piece.parse().map_err(|_| invalid())?;
            count += 1;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which protocol generation the describe actions resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiCapability {
    #[default]
    Legacy,
    Modern,
}

impl ApiCapability {
    pub fn from_versions(current: &ApiVersion, minimum: &ApiVersion) -> Self {
        if current >= minimum {
            ApiCapability::Modern
        } else {
            ApiCapability::Legacy
        }
    }

    /// Accepts the "newer protocol available" flag negotiated elsewhere.
    pub fn from_flag(modern_available: bool) -> Self {
        if modern_available {
            ApiCapability::Modern
        } else {
            ApiCapability::Legacy
        }
    }

    pub fn is_modern(self) -> bool {
        self == ApiCapability::Modern
    }
}
