//! # Fake Clients
//!
//! Scriptable implementations of [`LegacyClient`] and [`ModernClient`], one
//! [`Stub`] per operation. Tests script responses through the public fields
//! and inspect recorded arguments afterwards:
//!
//! ```rust
//! use platform_actor::fakes::FakeLegacyClient;
//! use platform_actor::clients::legacy::Buildpack;
//!
//! let client = FakeLegacyClient::new();
//! client
//!     .create_buildpack
//!     .expect()
//!     .with_warnings(["w1"])
//!     .return_ok(Buildpack { guid: "g-1".into(), ..Default::default() });
//! ```
//!
//! Clones share their stubs, so a test keeps one handle and gives the actor
//! another (wrapped in an `Arc`).

use crate::clients::legacy::{self, InstanceStat, LegacyClient, Stack};
use crate::clients::modern::{
    self, Droplet, IsolationSegment, ModernClient, Process, ProcessInstance,
};
use crate::clients::CcError;
use action_framework::mock::Stub;
use action_framework::{Outcome, Payload};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Arguments of one recorded `upload_buildpack` call. The payload is read to
/// the end so tests can assert on the bytes that were streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub guid: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub length: u64,
}

#[derive(Clone)]
pub struct FakeLegacyClient {
    pub create_buildpack: Stub<legacy::Buildpack, legacy::Buildpack, CcError>,
    pub upload_buildpack: Stub<UploadCall, (), CcError>,
    pub applications_by_name: Stub<String, Vec<legacy::Application>, CcError>,
    pub application_instances: Stub<String, Vec<InstanceStat>, CcError>,
    pub application_routes: Stub<String, Vec<legacy::Route>, CcError>,
    pub stack: Stub<String, Stack, CcError>,
}

impl FakeLegacyClient {
    pub fn new() -> Self {
        Self {
            create_buildpack: Stub::new("create_buildpack"),
            upload_buildpack: Stub::new("upload_buildpack"),
            applications_by_name: Stub::new("applications_by_name"),
            application_instances: Stub::new("application_instances"),
            application_routes: Stub::new("application_routes"),
            stack: Stub::new("stack"),
        }
    }
}

impl Default for FakeLegacyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LegacyClient for FakeLegacyClient {
    async fn create_buildpack(
        &self,
        buildpack: legacy::Buildpack,
    ) -> Outcome<legacy::Buildpack, CcError> {
        self.create_buildpack.call(buildpack)
    }

    async fn upload_buildpack(
        &self,
        guid: &str,
        path: &Path,
        mut payload: Payload,
        length: u64,
    ) -> Outcome<(), CcError> {
        let mut bytes = Vec::new();
        if let Err(e) = payload.read_to_end(&mut bytes).await {
            return Outcome::err(CcError::Request(e.to_string()), Vec::<String>::new());
        }
        self.upload_buildpack.call(UploadCall {
            guid: guid.to_string(),
            path: path.to_path_buf(),
            bytes,
            length,
        })
    }

    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<legacy::Application>, CcError> {
        self.applications_by_name.call(name.to_string())
    }

    async fn application_instances(&self, app_guid: &str) -> Outcome<Vec<InstanceStat>, CcError> {
        self.application_instances.call(app_guid.to_string())
    }

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<legacy::Route>, CcError> {
        self.application_routes.call(app_guid.to_string())
    }

    async fn stack(&self, stack_guid: &str) -> Outcome<Stack, CcError> {
        self.stack.call(stack_guid.to_string())
    }
}

#[derive(Clone)]
pub struct FakeModernClient {
    pub applications_by_name: Stub<String, Vec<modern::Application>, CcError>,
    pub application_processes: Stub<String, Vec<Process>, CcError>,
    pub process_instances: Stub<String, Vec<ProcessInstance>, CcError>,
    pub current_droplet: Stub<String, Option<Droplet>, CcError>,
    pub application_routes: Stub<String, Vec<modern::Route>, CcError>,
    pub application_isolation_segment: Stub<String, Option<IsolationSegment>, CcError>,
}

impl FakeModernClient {
    pub fn new() -> Self {
        Self {
            applications_by_name: Stub::new("applications_by_name"),
            application_processes: Stub::new("application_processes"),
            process_instances: Stub::new("process_instances"),
            current_droplet: Stub::new("current_droplet"),
            application_routes: Stub::new("application_routes"),
            application_isolation_segment: Stub::new("application_isolation_segment"),
        }
    }
}

impl Default for FakeModernClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModernClient for FakeModernClient {
    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<modern::Application>, CcError> {
        self.applications_by_name.call(name.to_string())
    }

    async fn application_processes(&self, app_guid: &str) -> Outcome<Vec<Process>, CcError> {
        self.application_processes.call(app_guid.to_string())
    }

    async fn process_instances(
        &self,
        process_guid: &str,
    ) -> Outcome<Vec<ProcessInstance>, CcError> {
        self.process_instances.call(process_guid.to_string())
    }

    async fn current_droplet(&self, app_guid: &str) -> Outcome<Option<Droplet>, CcError> {
        self.current_droplet.call(app_guid.to_string())
    }

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<modern::Route>, CcError> {
        self.application_routes.call(app_guid.to_string())
    }

    async fn application_isolation_segment(
        &self,
        app_guid: &str,
    ) -> Outcome<Option<IsolationSegment>, CcError> {
        self.application_isolation_segment.call(app_guid.to_string())
    }
}
