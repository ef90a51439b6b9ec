//! # System Wiring
//!
//! Building the actors is where the pieces meet: two typed clients (one per
//! protocol generation), the [`ApiCapability`] negotiated for the target, and
//! the actors that share those clients.
//!
//! ## The ActionSystem Pattern
//!
//! ```rust
//! use platform_actor::lifecycle::{ActionSystem, Settings};
//! use platform_actor::sim::InMemoryPlatform;
//! use std::sync::Arc;
//!
//! let platform = Arc::new(InMemoryPlatform::new());
//! let settings = Settings::from_toml_str("[api]\nversion = \"3.30.0\"").unwrap();
//!
//! let system = ActionSystem::from_settings(&settings, platform.clone(), platform).unwrap();
//! assert!(system.capability().is_modern());
//! ```
//!
//! Actors hold no state between calls, so there is nothing to start and
//! nothing to shut down: dropping the system drops its client handles.
//!
//! ## Structure
//!
//! - [`settings`] - [`Settings`] (TOML + environment), [`ApiVersion`],
//!   [`ApiCapability`]

pub mod settings;

pub use settings::{
    ApiCapability, ApiSettings, ApiVersion, LoggingSettings, Settings, SettingsError,
    API_VERSION_ENV,
};

use crate::app_summary_actor::AppSummaryActor;
use crate::buildpack_actor::BuildpackActor;
use crate::clients::{SharedLegacyClient, SharedModernClient};
use tracing::info;

/// The actors of one session, wired to shared clients.
#[derive(Clone)]
pub struct ActionSystem {
    pub buildpacks: BuildpackActor,
    pub apps: AppSummaryActor,
}

impl ActionSystem {
    pub fn new(
        legacy: SharedLegacyClient,
        modern: SharedModernClient,
        capability: ApiCapability,
    ) -> Self {
        info!(?capability, "Wiring action system");
        Self {
            buildpacks: BuildpackActor::new(legacy.clone()),
            apps: AppSummaryActor::new(legacy, modern, capability),
        }
    }

    /// Wires the system with the capability derived from `settings`.
    pub fn from_settings(
        settings: &Settings,
        legacy: SharedLegacyClient,
        modern: SharedModernClient,
    ) -> Result<Self, SettingsError> {
        Ok(Self::new(legacy, modern, settings.capability()?))
    }

    pub fn capability(&self) -> ApiCapability {
        self.apps.capability()
    }
}
