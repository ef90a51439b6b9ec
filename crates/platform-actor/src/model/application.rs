//! The version-independent application display model.
//!
//! [`ApplicationSummary`] is rebuilt on every query and handed to the command
//! layer fully populated. Nothing in it calls back into the action layer.
//! Missing remote data is represented as `None` (rendered blank), never as zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppState {
    Started,
    Stopped,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppState::Started => write!(f, "started"),
            AppState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Reported state of one running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceState {
    Running,
    Starting,
    Crashed,
    Down,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InstanceState::Running => "running",
            InstanceState::Starting => "starting",
            InstanceState::Crashed => "crashed",
            InstanceState::Down => "down",
            InstanceState::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// How the application's image is produced.
///
/// A buildpack application and a docker application are exclusive; the enum
/// makes it impossible to populate both. An application that was created but
/// never staged is `Buildpacks(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Buildpack names in detection order.
    Buildpacks(Vec<String>),
    /// Docker image reference.
    Docker(String),
}

impl Lifecycle {
    /// Buildpack names to display; empty for docker applications.
    pub fn buildpacks(&self) -> &[String] {
        match self {
            Lifecycle::Buildpacks(names) => names,
            Lifecycle::Docker(_) => &[],
        }
    }

    /// Docker image to display; `None` for buildpack applications.
    pub fn docker_image(&self) -> Option<&str> {
        match self {
            Lifecycle::Buildpacks(_) => None,
            Lifecycle::Docker(image) => Some(image),
        }
    }
}

/// Usage and state of one instance of a process group.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummary {
    pub index: u32,
    pub state: InstanceState,
    pub since: Option<DateTime<Utc>>,
    /// Fraction of one core, e.g. `0.25`.
    pub cpu: Option<f64>,
    pub memory_usage: Option<u64>,
    pub memory_quota: Option<u64>,
    pub disk_usage: Option<u64>,
    pub disk_quota: Option<u64>,
    pub details: Option<String>,
}

/// One horizontally scaled role of the application (e.g. `web`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSummary {
    pub process_type: String,
    pub desired_instances: u32,
    pub memory_in_mb: Option<u64>,
    pub disk_in_mb: Option<u64>,
    /// Reported instances; empty means "no running instances".
    pub instances: Vec<InstanceSummary>,
}

impl ProcessSummary {
    /// Number of instances currently reported as running.
    pub fn running_instances(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| i.state == InstanceState::Running)
            .count()
    }
}

/// Everything the `app` command displays, independent of protocol generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSummary {
    pub guid: String,
    pub name: String,
    pub state: AppState,
    pub processes: Vec<ProcessSummary>,
    pub lifecycle: Lifecycle,
    pub stack: Option<String>,
    pub last_uploaded: Option<DateTime<Utc>>,
    pub routes: Vec<String>,
    /// `None` means the field is not shown at all.
    pub isolation_segment: Option<String>,
}

impl ApplicationSummary {
    pub fn buildpacks(&self) -> &[String] {
        self.lifecycle.buildpacks()
    }

    pub fn docker_image(&self) -> Option<&str> {
        self.lifecycle.docker_image()
    }

    /// True when no process group reports any instance.
    pub fn has_no_running_instances(&self) -> bool {
        self.processes.iter().all(|p| p.instances.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(index: u32, state: InstanceState) -> InstanceSummary {
        InstanceSummary {
            index,
            state,
            since: None,
            cpu: None,
            memory_usage: None,
            memory_quota: None,
            disk_usage: None,
            disk_quota: None,
            details: None,
        }
    }

    #[test]
    fn lifecycle_accessors_are_exclusive() {
        let docker = Lifecycle::Docker("nginx:latest".into());
        assert!(docker.buildpacks().is_empty());
        assert_eq!(docker.docker_image(), Some("nginx:latest"));

        let buildpacks = Lifecycle::Buildpacks(vec!["ruby_buildpack".into(), "go".into()]);
        assert_eq!(buildpacks.buildpacks(), ["ruby_buildpack", "go"]);
        assert_eq!(buildpacks.docker_image(), None);
    }

    #[test]
    fn running_instances_ignores_other_states() {
        let process = ProcessSummary {
            process_type: "web".into(),
            desired_instances: 2,
            memory_in_mb: Some(128),
            disk_in_mb: None,
            instances: vec![
                instance(0, InstanceState::Running),
                instance(1, InstanceState::Starting),
            ],
        };
        assert_eq!(process.running_instances(), 1);
    }

    #[test]
    fn unknown_instance_states_deserialize() {
        let state: InstanceState = serde_json::from_str("\"UNCLAIMED\"").unwrap();
        assert_eq!(state, InstanceState::Unknown);
    }
}
