//! # Legacy Protocol Client
//!
//! Wire models and the typed client interface for the legacy protocol
//! generation. The legacy API folds an application's single process into the
//! application record itself and exposes one combined instance/stats listing.

use super::error::CcError;
use crate::model::{AppState, InstanceState};
use action_framework::{Outcome, Payload};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Buildpack record as sent to and returned by the legacy API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buildpack {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl From<Buildpack> for crate::model::Buildpack {
    fn from(wire: Buildpack) -> Self {
        Self {
            guid: wire.guid,
            name: wire.name,
            position: wire.position,
            enabled: wire.enabled,
            stack: wire.stack,
            locked: wire.locked,
        }
    }
}

impl From<crate::model::BuildpackCreate> for Buildpack {
    fn from(params: crate::model::BuildpackCreate) -> Self {
        Self {
            name: params.name,
            position: params.position,
            enabled: params.enabled,
            ..Default::default()
        }
    }
}

/// Application record; carries process sizing and lifecycle inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub guid: String,
    pub name: String,
    pub state: AppState,
    pub instances: u32,
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub disk_quota: Option<u64>,
    /// Buildpack assigned by the operator, if any.
    #[serde(default)]
    pub buildpack: Option<String>,
    /// Buildpack chosen by detection during the last staging.
    #[serde(default)]
    pub detected_buildpack: Option<String>,
    #[serde(default)]
    pub docker_image: Option<String>,
    #[serde(default)]
    pub package_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stack_guid: Option<String>,
}

/// One entry of the combined instance + stats listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStat {
    pub index: u32,
    pub state: InstanceState,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
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
pub struct Route {
    #[serde(default)]
    pub host: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl Route {
    /// `host.domain[:port]/path`, dropping the parts that are not set.
    pub fn url(&self) -> String {
        let mut url = if self.host.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.host, self.domain)
        };
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        url.push_str(&self.path);
        url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Typed client for the legacy protocol generation.
///
/// Every call returns its own warnings next to the result.
#[async_trait]
pub trait LegacyClient: Send + Sync {
    async fn create_buildpack(&self, buildpack: Buildpack) -> Outcome<Buildpack, CcError>;

    async fn upload_buildpack(
        &self,
        guid: &str,
        path: &Path,
        payload: Payload,
        length: u64,
    ) -> Outcome<(), CcError>;

    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<Application>, CcError>;

    /// Combined instance + stats listing. Fails with
    /// [`CcError::ApplicationStopped`] when the application is not running.
    async fn application_instances(&self, app_guid: &str)
        -> Outcome<Vec<InstanceStat>, CcError>;

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<Route>, CcError>;

    async fn stack(&self, stack_guid: &str) -> Outcome<Stack, CcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_url_covers_http_and_tcp_routes() {
        let http = Route {
            host: "demo".into(),
            domain: "apps.example.com".into(),
            path: "/v1".into(),
            port: None,
        };
        let tcp = Route {
            host: String::new(),
            domain: "tcp.example.com".into(),
            path: String::new(),
            port: Some(1024),
        };

        assert_eq!(http.url(), "demo.apps.example.com/v1");
        assert_eq!(tcp.url(), "tcp.example.com:1024");
    }

    #[test]
    fn application_deserializes_with_missing_optional_fields() {
        let app: Application = serde_json::from_str(
            r#"{"guid":"app-1","name":"demo","state":"STOPPED","instances":1}"#,
        )
        .unwrap();

        assert_eq!(app.state, AppState::Stopped);
        assert!(app.docker_image.is_none());
        assert!(app.package_updated_at.is_none());
    }

    #[test]
    fn create_payload_omits_unset_fields() {
        let payload = Buildpack {
            name: "demo-bp".into(),
            position: 42,
            enabled: true,
            ..Default::default()
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "demo-bp", "position": 42, "enabled": true})
        );
    }
}
