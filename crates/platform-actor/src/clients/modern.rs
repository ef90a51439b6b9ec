//! # Modern Protocol Client
//!
//! Wire models and the typed client interface for the newer protocol
//! generation. Processes, instances and droplets are separate resources.

use super::error::CcError;
use crate::model::{AppState, InstanceState};
use action_framework::Outcome;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleType {
    Buildpack,
    Docker,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleData {
    #[serde(default)]
    pub buildpacks: Vec<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLifecycle {
    #[serde(rename = "type")]
    pub kind: LifecycleType,
    #[serde(default)]
    pub data: LifecycleData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub guid: String,
    pub name: String,
    pub state: AppState,
    pub lifecycle: AppLifecycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub guid: String,
    #[serde(rename = "type")]
    pub process_type: String,
    pub instances: u32,
    #[serde(default)]
    pub memory_in_mb: Option<u64>,
    #[serde(default)]
    pub disk_in_mb: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInstance {
    pub index: u32,
    pub state: InstanceState,
    /// Seconds since the instance started.
    #[serde(default)]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory_usage: Option<u64>,
    #[serde(default)]
    pub memory_quota: Option<u64>,
    #[serde(default)]
    pub disk_usage: Option<u64>,
    #[serde(default)]
    pub disk_quota: Option<u64>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropletBuildpack {
    pub name: String,
    /// What the buildpack reported during detection, e.g. `ruby 2.5.1`.
    #[serde(default)]
    pub detect_output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Droplet {
    pub guid: String,
    #[serde(default)]
    pub buildpacks: Vec<DropletBuildpack>,
    #[serde(default)]
    pub stack: Option<String>,
    /// Docker image for docker-lifecycle droplets.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsolationSegment {
    pub guid: String,
    pub name: String,
}

/// Typed client for the modern protocol generation.
#[async_trait]
pub trait ModernClient: Send + Sync {
    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<Application>, CcError>;

    async fn application_processes(&self, app_guid: &str) -> Outcome<Vec<Process>, CcError>;

    async fn process_instances(&self, process_guid: &str)
        -> Outcome<Vec<ProcessInstance>, CcError>;

    /// `None` when the application has never been staged.
    async fn current_droplet(&self, app_guid: &str) -> Outcome<Option<Droplet>, CcError>;

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<Route>, CcError>;

    /// `None` when no isolation segment applies to the application.
    async fn application_isolation_segment(
        &self,
        app_guid: &str,
    ) -> Outcome<Option<IsolationSegment>, CcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_lifecycle_deserializes() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "guid": "app-1",
            "name": "demo",
            "state": "STARTED",
            "lifecycle": {
                "type": "buildpack",
                "data": { "buildpacks": ["ruby_buildpack", "go_buildpack"], "stack": "cflinuxfs2" }
            }
        }))
        .unwrap();

        assert_eq!(app.lifecycle.kind, LifecycleType::Buildpack);
        assert_eq!(app.lifecycle.data.buildpacks, ["ruby_buildpack", "go_buildpack"]);
    }

    #[test]
    fn docker_lifecycle_has_empty_data() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "guid": "app-2",
            "name": "web",
            "state": "STOPPED",
            "lifecycle": { "type": "docker" }
        }))
        .unwrap();

        assert_eq!(app.lifecycle.kind, LifecycleType::Docker);
        assert!(app.lifecycle.data.buildpacks.is_empty());
    }
}
