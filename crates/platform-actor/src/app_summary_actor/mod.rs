//! # Application Summary Actor
//!
//! Read-only actions that describe an application regardless of which
//! protocol generation the target speaks.
//!
//! ## Overview
//!
//! [`AppSummaryActor::describe`] works in two phases:
//!
//! 1. **Fetch** - resolve the application by name against the authoritative
//!    generation (chosen by [`ApiCapability`]) and gather everything that
//!    generation exposes into a tagged [`Snapshot`].
//! 2. **Normalize** - [`normalize`] turns either snapshot variant into the
//!    same [`ApplicationSummary`], so nothing downstream knows which API
//!    answered.
//!
//! Only resolution can fail the action with [`ActionError::NotFound`]. Missing
//! sub-resources (stack, droplet, routes, isolation segment) become absent
//! fields. Any other transport failure is translated and returned together
//! with the warnings gathered before it.

pub mod snapshot;

pub use snapshot::{normalize, Snapshot};

use crate::clients::{CcError, SharedLegacyClient, SharedModernClient};
use crate::error::{translate, ActionError};
use crate::lifecycle::ApiCapability;
use crate::model::{AppState, ApplicationSummary};
use action_framework::{Outcome, Warnings};
use chrono::Utc;
use snapshot::{LegacySnapshot, ModernSnapshot, ProcessSnapshot};
use tracing::{debug, info, instrument, warn};

/// Describes applications over whichever protocol generation is available.
#[derive(Clone)]
pub struct AppSummaryActor {
    legacy: SharedLegacyClient,
    modern: SharedModernClient,
    capability: ApiCapability,
}

impl AppSummaryActor {
    pub fn new(
        legacy: SharedLegacyClient,
        modern: SharedModernClient,
        capability: ApiCapability,
    ) -> Self {
        Self {
            legacy,
            modern,
            capability,
        }
    }

    pub fn capability(&self) -> ApiCapability {
        self.capability
    }

    /// Builds the full display model for the application called `name`.
    #[instrument(skip(self), fields(capability = ?self.capability))]
    pub async fn describe(&self, name: &str) -> Outcome<ApplicationSummary, ActionError> {
        let mut warnings = Warnings::new();
        let result = self.fetch(&mut warnings, name).await.map(|snapshot| {
            let summary = normalize(snapshot, Utc::now());
            info!(
                guid = %summary.guid,
                processes = summary.processes.len(),
                "Application described"
            );
            summary
        });
        if let Err(error) = &result {
            warn!(%error, "Describe failed");
        }
        Outcome::new(result, warnings)
    }

    /// Resolves `name` to its GUID without fetching anything else.
    #[instrument(skip(self), fields(capability = ?self.capability))]
    pub async fn application_guid(&self, name: &str) -> Outcome<String, ActionError> {
        let mut warnings = Warnings::new();
        let result = match self.capability {
            ApiCapability::Legacy => self
                .resolve_legacy(&mut warnings, name)
                .await
                .map(|app| app.guid),
            ApiCapability::Modern => self
                .resolve_modern(&mut warnings, name)
                .await
                .map(|app| app.guid),
        };
        Outcome::new(result, warnings)
    }

    async fn fetch(&self, warnings: &mut Warnings, name: &str) -> Result<Snapshot, ActionError> {
        match self.capability {
            ApiCapability::Legacy => self.fetch_legacy(warnings, name).await.map(Snapshot::Legacy),
            ApiCapability::Modern => self.fetch_modern(warnings, name).await.map(Snapshot::Modern),
        }
    }

    async fn resolve_legacy(
        &self,
        warnings: &mut Warnings,
        name: &str,
    ) -> Result<crate::clients::legacy::Application, ActionError> {
        let apps = warnings
            .absorb(self.legacy.applications_by_name(name).await)
            .map_err(|e| translate(e, name))?;
        apps.into_iter()
            .next()
            .ok_or_else(|| ActionError::app_not_found(name))
    }

    async fn resolve_modern(
        &self,
        warnings: &mut Warnings,
        name: &str,
    ) -> Result<crate::clients::modern::Application, ActionError> {
        let apps = warnings
            .absorb(self.modern.applications_by_name(name).await)
            .map_err(|e| translate(e, name))?;
        apps.into_iter()
            .next()
            .ok_or_else(|| ActionError::app_not_found(name))
    }

    async fn fetch_legacy(
        &self,
        warnings: &mut Warnings,
        name: &str,
    ) -> Result<LegacySnapshot, ActionError> {
        let app = self.resolve_legacy(warnings, name).await?;
        debug!(guid = %app.guid, state = %app.state, "Resolved application");

        let instances = if app.state == AppState::Started {
            match warnings.absorb(self.legacy.application_instances(&app.guid).await) {
                Ok(instances) => instances,
                Err(CcError::ApplicationStopped { .. }) => {
                    debug!("Application reported stopped, no instances");
                    Vec::new()
                }
                Err(CcError::ResourceNotFound { .. }) => Vec::new(),
                Err(e) => return Err(translate(e, name)),
            }
        } else {
            Vec::new()
        };

        let routes = optional(
            warnings.absorb(self.legacy.application_routes(&app.guid).await),
            name,
        )?
        .unwrap_or_default();

        let stack = match app.stack_guid.as_deref() {
            Some(stack_guid) => {
                optional(warnings.absorb(self.legacy.stack(stack_guid).await), name)?
            }
            None => None,
        };

        Ok(LegacySnapshot {
            app,
            instances,
            routes,
            stack,
        })
    }

    async fn fetch_modern(
        &self,
        warnings: &mut Warnings,
        name: &str,
    ) -> Result<ModernSnapshot, ActionError> {
        let app = self.resolve_modern(warnings, name).await?;
        debug!(guid = %app.guid, state = %app.state, "Resolved application");

        let listed = warnings
            .absorb(self.modern.application_processes(&app.guid).await)
            .map_err(|e| translate(e, name))?;

        let mut processes = Vec::with_capacity(listed.len());
        for process in listed {
            let instances = optional(
                warnings.absorb(self.modern.process_instances(&process.guid).await),
                name,
            )?
            .unwrap_or_default();
            debug!(
                process_type = %process.process_type,
                instances = instances.len(),
                "Fetched process instances"
            );
            processes.push(ProcessSnapshot { process, instances });
        }

        let droplet = optional(
            warnings.absorb(self.modern.current_droplet(&app.guid).await),
            name,
        )?
        .flatten();

        let routes = optional(
            warnings.absorb(self.modern.application_routes(&app.guid).await),
            name,
        )?
        .unwrap_or_default();

        let isolation_segment = optional(
            warnings.absorb(self.modern.application_isolation_segment(&app.guid).await),
            name,
        )?
        .flatten();

        Ok(ModernSnapshot {
            app,
            processes,
            droplet,
            routes,
            isolation_segment,
        })
    }
}

/// A sub-resource that is gone is an absent field, not a failure.
fn optional<T>(result: Result<T, CcError>, subject: &str) -> Result<Option<T>, ActionError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CcError::ResourceNotFound { message }) => {
            debug!(%message, "Sub-resource not found, leaving it blank");
            Ok(None)
        }
        Err(e) => Err(translate(e, subject)),
    }
}
