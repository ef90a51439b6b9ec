//! # In-Memory Platform
//!
//! [`InMemoryPlatform`] implements both [`LegacyClient`] and [`ModernClient`]
//! over one shared, mutex-guarded state, so an [`ActionSystem`] can be driven
//! end to end without a network. Both generations see the same applications;
//! only the wire shapes differ.
//!
//! Buildpack rules mirror the remote platform:
//!
//! - creating a buildpack never assigns a stack; uploading bits does
//!   ([`InMemoryPlatform::DEFAULT_STACK`]),
//! - a name may exist once without a stack, and once per stack,
//! - a position past the end of the list is clamped, with a warning.
//!
//! [`ActionSystem`]: crate::lifecycle::ActionSystem

use crate::clients::legacy::{self, InstanceStat, LegacyClient, Stack};
use crate::clients::modern::{
    self, AppLifecycle, Droplet, DropletBuildpack, IsolationSegment, LifecycleData, LifecycleType,
    ModernClient, Process, ProcessInstance,
};
use crate::clients::CcError;
use crate::model::{AppState, InstanceState, Lifecycle};
use action_framework::{Outcome, Payload, Warnings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

const STACKS: [&str; 2] = ["cflinuxfs2", "cflinuxfs3"];

/// Seconds every simulated running instance reports as uptime.
const SIM_UPTIME_SECS: u64 = 60;

/// An application seeded into the simulator.
#[derive(Debug, Clone)]
pub struct SimApp {
    pub guid: String,
    pub name: String,
    pub state: AppState,
    pub lifecycle: Lifecycle,
    pub stack: Option<String>,
    pub processes: Vec<SimProcess>,
    pub routes: Vec<String>,
    pub isolation_segment: Option<String>,
    /// When the current droplet was staged; `None` for never-pushed apps.
    pub staged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SimProcess {
    pub process_type: String,
    pub instances: u32,
    pub memory_in_mb: u64,
    pub disk_in_mb: u64,
}

impl SimApp {
    pub fn buildpack(name: &str, buildpacks: &[&str]) -> Self {
        Self::with_lifecycle(
            name,
            Lifecycle::Buildpacks(buildpacks.iter().map(|b| b.to_string()).collect()),
        )
    }

    pub fn docker(name: &str, image: &str) -> Self {
        Self::with_lifecycle(name, Lifecycle::Docker(image.to_string()))
    }

    fn with_lifecycle(name: &str, lifecycle: Lifecycle) -> Self {
        Self {
            guid: format!("{name}-guid"),
            name: name.to_string(),
            state: AppState::Started,
            lifecycle,
            stack: None,
            processes: Vec::new(),
            routes: Vec::new(),
            isolation_segment: None,
            staged_at: None,
        }
    }

    pub fn with_process(mut self, process_type: &str, instances: u32, memory_in_mb: u64) -> Self {
        self.processes.push(SimProcess {
            process_type: process_type.to_string(),
            instances,
            memory_in_mb,
            disk_in_mb: 1024,
        });
        self
    }

    pub fn with_route(mut self, url: &str) -> Self {
        self.routes.push(url.to_string());
        self
    }

    pub fn with_stack(mut self, stack: &str) -> Self {
        self.stack = Some(stack.to_string());
        self
    }

    pub fn with_isolation_segment(mut self, segment: &str) -> Self {
        self.isolation_segment = Some(segment.to_string());
        self
    }

    pub fn staged_at(mut self, at: DateTime<Utc>) -> Self {
        self.staged_at = Some(at);
        self
    }

    pub fn stopped(mut self) -> Self {
        self.state = AppState::Stopped;
        self
    }

    fn web(&self) -> Option<&SimProcess> {
        self.processes.iter().find(|p| p.process_type == "web")
    }

    fn process_guid(&self, process: &SimProcess) -> String {
        format!("{}-{}", self.guid, process.process_type)
    }
}

#[derive(Default)]
struct PlatformState {
    buildpacks: Vec<legacy::Buildpack>,
    bits: HashMap<String, Vec<u8>>,
    apps: Vec<SimApp>,
    next_guid: u64,
}

/// Stateful stand-in for the remote platform.
#[derive(Default)]
pub struct InMemoryPlatform {
    state: Mutex<PlatformState>,
}

impl InMemoryPlatform {
    /// Stack assigned to buildpacks when their bits are uploaded.
    pub const DEFAULT_STACK: &'static str = "cflinuxfs3";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app(self, app: SimApp) -> Self {
        self.lock().apps.push(app);
        self
    }

    /// Adds a buildpack that already has a stack, as if uploaded earlier.
    pub fn with_buildpack(self, name: &str, stack: Option<&str>) -> Self {
        {
            let mut state = self.lock();
            let guid = state.allocate_guid("bp");
            let position = state.buildpacks.len() as i32 + 1;
            state.buildpacks.push(legacy::Buildpack {
                guid,
                name: name.to_string(),
                position,
                enabled: true,
                stack: stack.map(str::to_string),
                locked: Some(false),
            });
        }
        self
    }

    pub fn buildpacks(&self) -> Vec<legacy::Buildpack> {
        self.lock().buildpacks.clone()
    }

    pub fn uploaded_bits(&self, guid: &str) -> Option<Vec<u8>> {
        self.lock().bits.get(guid).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find_app<T>(&self, guid: &str, f: impl FnOnce(&SimApp) -> T) -> Result<T, CcError> {
        let state = self.lock();
        let found = state.apps.iter().find(|a| a.guid == guid).map(f);
        found.ok_or_else(|| CcError::not_found(format!("App {guid} not found")))
    }

    fn find_process<T>(
        &self,
        process_guid: &str,
        f: impl FnOnce(&SimApp, &SimProcess) -> T,
    ) -> Result<T, CcError> {
        let state = self.lock();
        let found = state
            .apps
            .iter()
            .find_map(|app| {
                app.processes
                    .iter()
                    .find(|p| app.process_guid(p) == process_guid)
                    .map(|p| (app, p))
            })
            .map(|(app, process)| f(app, process));
        found.ok_or_else(|| CcError::not_found(format!("Process {process_guid} not found")))
    }
}

impl PlatformState {
    fn allocate_guid(&mut self, prefix: &str) -> String {
        self.next_guid += 1;
        format!("{prefix}-{}", self.next_guid)
    }
}

fn stack_guid(name: &str) -> String {
    format!("stack-{name}")
}

fn outcome<T>(result: Result<T, CcError>) -> Outcome<T, CcError> {
    Outcome::new(result, Warnings::new())
}

fn running_instances(app: &SimApp, process: &SimProcess) -> Vec<InstanceState> {
    match app.state {
        AppState::Started => vec![InstanceState::Running; process.instances as usize],
        AppState::Stopped => Vec::new(),
    }
}

/// Splits `host.domain/path` the way the legacy route resource stores it.
fn legacy_route(url: &str) -> legacy::Route {
    let (address, path) = match url.find('/') {
        Some(i) => (&url[..i], url[i..].to_string()),
        None => (url, String::new()),
    };
    let (host, domain) = match address.split_once('.') {
        Some((host, domain)) => (host.to_string(), domain.to_string()),
        None => (String::new(), address.to_string()),
    };
    legacy::Route {
        host,
        domain,
        path,
        port: None,
    }
}

#[async_trait]
impl LegacyClient for InMemoryPlatform {
    #[instrument(skip(self, buildpack), fields(name = %buildpack.name))]
    async fn create_buildpack(
        &self,
        buildpack: legacy::Buildpack,
    ) -> Outcome<legacy::Buildpack, CcError> {
        let mut state = self.lock();
        let mut warnings = Warnings::new();

        if let Some(existing) = state.buildpacks.iter().find(|b| b.name == buildpack.name) {
            let error = match existing.stack {
                None => CcError::BuildpackAlreadyExistsWithoutStack {
                    message: format!(
                        "Buildpack with name '{}' and an unassigned stack already exists",
                        buildpack.name
                    ),
                },
                Some(_) => CcError::BuildpackNameTaken {
                    message: format!("The buildpack name is already in use: {}", buildpack.name),
                },
            };
            return Outcome::err(error, warnings);
        }

        let last = state.buildpacks.len() as i32 + 1;
        let position = if buildpack.position < 1 || buildpack.position > last {
            warnings.push(format!(
                "Position {} is out of range, buildpack placed at position {last}",
                buildpack.position
            ));
            last
        } else {
            buildpack.position
        };
        for other in state.buildpacks.iter_mut().filter(|b| b.position >= position) {
            other.position += 1;
        }

        let created = legacy::Buildpack {
            guid: state.allocate_guid("bp"),
            name: buildpack.name,
            position,
            enabled: buildpack.enabled,
            stack: None,
            locked: Some(false),
        };
        debug!(guid = %created.guid, position, "Simulated buildpack created");
        state.buildpacks.push(created.clone());
        Outcome::ok(created, warnings)
    }

    #[instrument(skip(self, path, payload))]
    async fn upload_buildpack(
        &self,
        guid: &str,
        path: &Path,
        mut payload: Payload,
        length: u64,
    ) -> Outcome<(), CcError> {
        let mut bytes = Vec::new();
        if let Err(e) = payload.read_to_end(&mut bytes).await {
            return outcome(Err(CcError::Request(e.to_string())));
        }
        if bytes.len() as u64 != length {
            return outcome(Err(CcError::UnexpectedResponse {
                status: 422,
                message: format!(
                    "Uploaded {} bytes for {} but declared {length}",
                    bytes.len(),
                    path.display()
                ),
            }));
        }

        let mut state = self.lock();
        let Some(index) = state.buildpacks.iter().position(|b| b.guid == guid) else {
            return outcome(Err(CcError::not_found(format!("Buildpack {guid} not found"))));
        };
        let name = state.buildpacks[index].name.clone();
        let stack = state.buildpacks[index]
            .stack
            .clone()
            .unwrap_or_else(|| Self::DEFAULT_STACK.to_string());

        let conflict = state.buildpacks.iter().any(|b| {
            b.guid != guid && b.name == name && b.stack.as_deref() == Some(stack.as_str())
        });
        if conflict {
            return outcome(Err(CcError::BuildpackAlreadyExistsForStack {
                message: format!("The buildpack name {name} is already in use with stack {stack}"),
            }));
        }

        state.buildpacks[index].stack = Some(stack);
        state.bits.insert(guid.to_string(), bytes);
        debug!(length, "Simulated buildpack bits stored");
        outcome(Ok(()))
    }

    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<legacy::Application>, CcError> {
        let state = self.lock();
        let apps = state
            .apps
            .iter()
            .filter(|app| app.name == name)
            .map(|app| {
                let web = app.web();
                legacy::Application {
                    guid: app.guid.clone(),
                    name: app.name.clone(),
                    state: app.state,
                    instances: web.map_or(0, |p| p.instances),
                    memory: web.map(|p| p.memory_in_mb),
                    disk_quota: web.map(|p| p.disk_in_mb),
                    buildpack: app.lifecycle.buildpacks().first().cloned(),
                    detected_buildpack: None,
                    docker_image: app.lifecycle.docker_image().map(str::to_string),
                    package_updated_at: app.staged_at,
                    stack_guid: app.stack.as_deref().map(stack_guid),
                }
            })
            .collect();
        outcome(Ok(apps))
    }

    async fn application_instances(&self, app_guid: &str) -> Outcome<Vec<InstanceStat>, CcError> {
        let result = self.find_app(app_guid, |app| {
            if app.state == AppState::Stopped {
                return Err(CcError::ApplicationStopped {
                    message: format!("Could not fetch stats for stopped app: {}", app.name),
                });
            }
            let Some(web) = app.web() else {
                return Ok(Vec::new());
            };
            Ok(running_instances(app, web)
                .into_iter()
                .enumerate()
                .map(|(index, state)| InstanceStat {
                    index: index as u32,
                    state,
                    since: app.staged_at,
                    cpu: Some(0.0),
                    memory_usage: Some(0),
                    memory_quota: Some(web.memory_in_mb * 1024 * 1024),
                    disk_usage: Some(0),
                    disk_quota: Some(web.disk_in_mb * 1024 * 1024),
                    details: None,
                })
                .collect())
        });
        outcome(result.and_then(|r| r))
    }

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<legacy::Route>, CcError> {
        outcome(self.find_app(app_guid, |app| {
            app.routes.iter().map(|url| legacy_route(url)).collect()
        }))
    }

    async fn stack(&self, guid: &str) -> Outcome<Stack, CcError> {
        let stack = STACKS
            .iter()
            .find(|name| stack_guid(name) == guid)
            .map(|name| Stack {
                guid: guid.to_string(),
                name: name.to_string(),
                description: format!("{name} simulated stack"),
            })
            .ok_or_else(|| CcError::not_found(format!("Stack {guid} not found")));
        outcome(stack)
    }
}

#[async_trait]
impl ModernClient for InMemoryPlatform {
    async fn applications_by_name(&self, name: &str) -> Outcome<Vec<modern::Application>, CcError> {
        let state = self.lock();
        let apps = state
            .apps
            .iter()
            .filter(|app| app.name == name)
            .map(|app| {
                let (kind, buildpacks) = match &app.lifecycle {
                    Lifecycle::Buildpacks(names) => (LifecycleType::Buildpack, names.clone()),
                    Lifecycle::Docker(_) => (LifecycleType::Docker, Vec::new()),
                };
                modern::Application {
                    guid: app.guid.clone(),
                    name: app.name.clone(),
                    state: app.state,
                    lifecycle: AppLifecycle {
                        kind,
                        data: LifecycleData {
                            buildpacks,
                            stack: app.stack.clone(),
                        },
                    },
                }
            })
            .collect();
        outcome(Ok(apps))
    }

    async fn application_processes(&self, app_guid: &str) -> Outcome<Vec<Process>, CcError> {
        outcome(self.find_app(app_guid, |app| {
            app.processes
                .iter()
                .map(|p| Process {
                    guid: app.process_guid(p),
                    process_type: p.process_type.clone(),
                    instances: p.instances,
                    memory_in_mb: Some(p.memory_in_mb),
                    disk_in_mb: Some(p.disk_in_mb),
                })
                .collect()
        }))
    }

    async fn process_instances(
        &self,
        process_guid: &str,
    ) -> Outcome<Vec<ProcessInstance>, CcError> {
        outcome(self.find_process(process_guid, |app, process| {
            running_instances(app, process)
                .into_iter()
                .enumerate()
                .map(|(index, state)| ProcessInstance {
                    index: index as u32,
                    state,
                    uptime: Some(SIM_UPTIME_SECS),
                    cpu: Some(0.0),
                    memory_usage: Some(0),
                    memory_quota: Some(process.memory_in_mb * 1024 * 1024),
                    disk_usage: Some(0),
                    disk_quota: Some(process.disk_in_mb * 1024 * 1024),
                    details: None,
                })
                .collect()
        }))
    }

    async fn current_droplet(&self, app_guid: &str) -> Outcome<Option<Droplet>, CcError> {
        outcome(self.find_app(app_guid, |app| {
            app.staged_at.map(|created_at| Droplet {
                guid: format!("{}-droplet", app.guid),
                buildpacks: app
                    .lifecycle
                    .buildpacks()
                    .iter()
                    .map(|name| DropletBuildpack {
                        name: name.clone(),
                        detect_output: None,
                    })
                    .collect(),
                stack: app.stack.clone(),
                image: app.lifecycle.docker_image().map(str::to_string),
                created_at: Some(created_at),
            })
        }))
    }

    async fn application_routes(&self, app_guid: &str) -> Outcome<Vec<modern::Route>, CcError> {
        outcome(self.find_app(app_guid, |app| {
            app.routes
                .iter()
                .map(|url| modern::Route { url: url.clone() })
                .collect()
        }))
    }

    async fn application_isolation_segment(
        &self,
        app_guid: &str,
    ) -> Outcome<Option<IsolationSegment>, CcError> {
        outcome(self.find_app(app_guid, |app| {
            app.isolation_segment.as_ref().map(|name| IsolationSegment {
                guid: format!("{name}-guid"),
                name: name.clone(),
            })
        }))
    }
}
