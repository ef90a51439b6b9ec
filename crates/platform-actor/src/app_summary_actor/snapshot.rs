//! Raw per-generation data for one application, and the single function that
//! turns it into an [`ApplicationSummary`].

use crate::clients::legacy::{self, InstanceStat, Stack};
use crate::clients::modern::{
    self, Droplet, IsolationSegment, LifecycleType, Process, ProcessInstance,
};
use crate::model::{ApplicationSummary, InstanceSummary, Lifecycle, ProcessSummary};
use chrono::{DateTime, Duration, Utc};

/// The legacy generation folds its single process into the application record.
pub const LEGACY_PROCESS_TYPE: &str = "web";

/// Everything fetched for one application, tagged by protocol generation.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Legacy(LegacySnapshot),
    Modern(ModernSnapshot),
}

#[derive(Debug, Clone)]
pub struct LegacySnapshot {
    pub app: legacy::Application,
    pub instances: Vec<InstanceStat>,
    pub routes: Vec<legacy::Route>,
    pub stack: Option<Stack>,
}

#[derive(Debug, Clone)]
pub struct ModernSnapshot {
    pub app: modern::Application,
    pub processes: Vec<ProcessSnapshot>,
    pub droplet: Option<Droplet>,
    pub routes: Vec<modern::Route>,
    pub isolation_segment: Option<IsolationSegment>,
}

#[derive(Debug, Clone)]
pub struct ProcessSnapshot {
    pub process: Process,
    pub instances: Vec<ProcessInstance>,
}

/// Builds the display model. `now` anchors uptime-based `since` values.
pub fn normalize(snapshot: Snapshot, now: DateTime<Utc>) -> ApplicationSummary {
    match snapshot {
        Snapshot::Legacy(legacy) => normalize_legacy(legacy),
        Snapshot::Modern(modern) => normalize_modern(modern, now),
    }
}

fn normalize_legacy(snapshot: LegacySnapshot) -> ApplicationSummary {
    let LegacySnapshot {
        app,
        mut instances,
        routes,
        stack,
    } = snapshot;

    instances.sort_by_key(|i| i.index);
    let process = ProcessSummary {
        process_type: LEGACY_PROCESS_TYPE.to_string(),
        desired_instances: app.instances,
        memory_in_mb: app.memory,
        disk_in_mb: app.disk_quota,
        instances: instances.into_iter().map(legacy_instance).collect(),
    };

    let lifecycle = match non_empty(app.docker_image) {
        Some(image) => Lifecycle::Docker(image),
        None => Lifecycle::Buildpacks(
            non_empty(app.buildpack)
                .or_else(|| non_empty(app.detected_buildpack))
                .into_iter()
                .collect(),
        ),
    };

    ApplicationSummary {
        guid: app.guid,
        name: app.name,
        state: app.state,
        processes: vec![process],
        lifecycle,
        stack: stack.map(|s| s.name),
        last_uploaded: app.package_updated_at,
        routes: routes.iter().map(legacy::Route::url).collect(),
        isolation_segment: None,
    }
}

fn legacy_instance(stat: InstanceStat) -> InstanceSummary {
    InstanceSummary {
        index: stat.index,
        state: stat.state,
        since: stat.since,
        cpu: stat.cpu,
        memory_usage: stat.memory_usage,
        memory_quota: stat.memory_quota,
        disk_usage: stat.disk_usage,
        disk_quota: stat.disk_quota,
        details: stat.details,
    }
}

fn normalize_modern(snapshot: ModernSnapshot, now: DateTime<Utc>) -> ApplicationSummary {
    let ModernSnapshot {
        app,
        mut processes,
        droplet,
        routes,
        isolation_segment,
    } = snapshot;

    // web first, the rest in the order the API listed them
    processes.sort_by_key(|p| p.process.process_type != LEGACY_PROCESS_TYPE);
    let processes = processes
        .into_iter()
        .map(|p| modern_process(p, now))
        .collect();

    let data = app.lifecycle.data;
    let lifecycle = match app.lifecycle.kind {
        LifecycleType::Docker => Lifecycle::Docker(
            droplet
                .as_ref()
                .and_then(|d| d.image.clone())
                .unwrap_or_default(),
        ),
        LifecycleType::Buildpack => match droplet.as_ref() {
            Some(d) if !d.buildpacks.is_empty() => Lifecycle::Buildpacks(
                d.buildpacks
                    .iter()
                    .map(|b| match b.detect_output.as_deref() {
                        Some(output) if !output.is_empty() => output.to_string(),
                        _ => b.name.clone(),
                    })
                    .collect(),
            ),
            _ => Lifecycle::Buildpacks(data.buildpacks),
        },
    };

    let stack = droplet
        .as_ref()
        .and_then(|d| d.stack.clone())
        .or(data.stack);

    ApplicationSummary {
        guid: app.guid,
        name: app.name,
        state: app.state,
        processes,
        lifecycle,
        stack,
        last_uploaded: droplet.and_then(|d| d.created_at),
        routes: routes.into_iter().map(|r| r.url).collect(),
        isolation_segment: isolation_segment.map(|s| s.name),
    }
}

fn modern_process(snapshot: ProcessSnapshot, now: DateTime<Utc>) -> ProcessSummary {
    let ProcessSnapshot {
        process,
        mut instances,
    } = snapshot;
    instances.sort_by_key(|i| i.index);

    ProcessSummary {
        process_type: process.process_type,
        desired_instances: process.instances,
        memory_in_mb: process.memory_in_mb,
        disk_in_mb: process.disk_in_mb,
        instances: instances
            .into_iter()
            .map(|i| InstanceSummary {
                index: i.index,
                state: i.state,
                since: i.uptime.and_then(|secs| started_at(now, secs)),
                cpu: i.cpu,
                memory_usage: i.memory_usage,
                memory_quota: i.memory_quota,
                disk_usage: i.disk_usage,
                disk_quota: i.disk_quota,
                details: i.details,
            })
            .collect(),
    }
}

/// `None` when the uptime reaches back past what a timestamp can hold.
fn started_at(now: DateTime<Utc>, uptime_secs: u64) -> Option<DateTime<Utc>> {
    let uptime = Duration::try_seconds(i64::try_from(uptime_secs).ok()?)?;
    now.checked_sub_signed(uptime)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::modern::{AppLifecycle, DropletBuildpack, LifecycleData};
    use crate::model::{AppState, InstanceState};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap()
    }

    fn legacy_app() -> legacy::Application {
        legacy::Application {
            guid: "app-guid".into(),
            name: "demo".into(),
            state: AppState::Started,
            instances: 2,
            memory: Some(128),
            disk_quota: Some(256),
            buildpack: None,
            detected_buildpack: Some("staticfile".into()),
            docker_image: None,
            package_updated_at: Some(now()),
            stack_guid: Some("stack-guid".into()),
        }
    }

    fn modern_app(kind: LifecycleType, buildpacks: &[&str]) -> modern::Application {
        modern::Application {
            guid: "app-guid".into(),
            name: "demo".into(),
            state: AppState::Started,
            lifecycle: AppLifecycle {
                kind,
                data: LifecycleData {
                    buildpacks: buildpacks.iter().map(|b| b.to_string()).collect(),
                    stack: Some("cflinuxfs2".into()),
                },
            },
        }
    }

    fn modern_snapshot(app: modern::Application) -> ModernSnapshot {
        ModernSnapshot {
            app,
            processes: Vec::new(),
            droplet: None,
            routes: Vec::new(),
            isolation_segment: None,
        }
    }

    #[test]
    fn legacy_reshapes_into_one_web_process() {
        let stat = |index, state| InstanceStat {
            index,
            state,
            since: Some(now()),
            cpu: Some(0.1),
            memory_usage: Some(1024),
            memory_quota: Some(2048),
            disk_usage: None,
            disk_quota: None,
            details: None,
        };
        let summary = normalize(
            Snapshot::Legacy(LegacySnapshot {
                app: legacy_app(),
                instances: vec![stat(1, InstanceState::Starting), stat(0, InstanceState::Running)],
                routes: Vec::new(),
                stack: Some(Stack {
                    guid: "stack-guid".into(),
                    name: "cflinuxfs2".into(),
                    description: String::new(),
                }),
            }),
            now(),
        );

        assert_eq!(summary.processes.len(), 1);
        let web = &summary.processes[0];
        assert_eq!(web.process_type, "web");
        assert_eq!(web.desired_instances, 2);
        assert_eq!(web.memory_in_mb, Some(128));
        assert_eq!(web.instances[0].index, 0);
        assert_eq!(web.running_instances(), 1);
        assert_eq!(summary.stack.as_deref(), Some("cflinuxfs2"));
        assert_eq!(summary.buildpacks(), ["staticfile"]);
        assert_eq!(summary.isolation_segment, None);
    }

    #[test]
    fn legacy_assigned_buildpack_wins_over_detected() {
        let mut app = legacy_app();
        app.buildpack = Some("staticfile_buildpack".into());

        let summary = normalize(
            Snapshot::Legacy(LegacySnapshot {
                app,
                instances: Vec::new(),
                routes: Vec::new(),
                stack: None,
            }),
            now(),
        );

        assert_eq!(summary.buildpacks(), ["staticfile_buildpack"]);
        assert_eq!(summary.stack, None);
    }

    #[test]
    fn legacy_docker_app_has_no_buildpacks() {
        let mut app = legacy_app();
        app.docker_image = Some("cloudfoundry/diego-docker-app-custom:latest".into());

        let summary = normalize(
            Snapshot::Legacy(LegacySnapshot {
                app,
                instances: Vec::new(),
                routes: Vec::new(),
                stack: None,
            }),
            now(),
        );

        assert_eq!(
            summary.docker_image(),
            Some("cloudfoundry/diego-docker-app-custom:latest")
        );
        assert!(summary.buildpacks().is_empty());
    }

    #[test]
    fn modern_droplet_buildpacks_keep_detection_order() {
        let mut snapshot = modern_snapshot(modern_app(LifecycleType::Buildpack, &[]));
        snapshot.droplet = Some(Droplet {
            guid: "droplet-guid".into(),
            buildpacks: vec![
                DropletBuildpack {
                    name: "ruby_buildpack".into(),
                    detect_output: None,
                },
                DropletBuildpack {
                    name: "go_buildpack".into(),
                    detect_output: Some("go".into()),
                },
            ],
            stack: Some("cflinuxfs3".into()),
            image: None,
            created_at: Some(now()),
        });

        let summary = normalize(Snapshot::Modern(snapshot), now());

        assert_eq!(summary.buildpacks(), ["ruby_buildpack", "go"]);
        assert_eq!(summary.stack.as_deref(), Some("cflinuxfs3"));
        assert_eq!(summary.last_uploaded, Some(now()));
        assert_eq!(summary.docker_image(), None);
    }

    #[test]
    fn modern_unstaged_app_falls_back_to_declared_lifecycle() {
        let app = modern_app(LifecycleType::Buildpack, &["staticfile_buildpack"]);
        let snapshot = modern_snapshot(app);

        let summary = normalize(Snapshot::Modern(snapshot), now());

        assert_eq!(summary.buildpacks(), ["staticfile_buildpack"]);
        assert_eq!(summary.stack.as_deref(), Some("cflinuxfs2"));
        assert_eq!(summary.last_uploaded, None);
        assert!(summary.processes.is_empty());
    }

    #[test]
    fn modern_docker_app_uses_droplet_image() {
        let mut snapshot = modern_snapshot(modern_app(LifecycleType::Docker, &[]));
        snapshot.droplet = Some(Droplet {
            guid: "droplet-guid".into(),
            buildpacks: Vec::new(),
            stack: None,
            image: Some("nginx:latest".into()),
            created_at: None,
        });

        let summary = normalize(Snapshot::Modern(snapshot), now());

        assert_eq!(summary.docker_image(), Some("nginx:latest"));
        assert!(summary.buildpacks().is_empty());
    }

    #[test]
    fn modern_since_is_derived_from_uptime() {
        let mut snapshot = modern_snapshot(modern_app(LifecycleType::Buildpack, &[]));
        snapshot.processes = vec![
            ProcessSnapshot {
                process: Process {
                    guid: "worker-guid".into(),
                    process_type: "worker".into(),
                    instances: 1,
                    memory_in_mb: None,
                    disk_in_mb: None,
                },
                instances: Vec::new(),
            },
            ProcessSnapshot {
                process: Process {
                    guid: "web-guid".into(),
                    process_type: "web".into(),
                    instances: 1,
                    memory_in_mb: Some(32),
                    disk_in_mb: Some(1024),
                },
                instances: vec![ProcessInstance {
                    index: 0,
                    state: InstanceState::Running,
                    uptime: Some(90),
                    cpu: Some(0.02),
                    memory_usage: None,
                    memory_quota: None,
                    disk_usage: None,
                    disk_quota: None,
                    details: None,
                }],
            },
        ];

        let summary = normalize(Snapshot::Modern(snapshot), now());

        assert_eq!(summary.processes[0].process_type, "web");
        assert_eq!(summary.processes[1].process_type, "worker");
        assert_eq!(
            summary.processes[0].instances[0].since,
            Some(now() - Duration::seconds(90))
        );
        assert!(summary.processes[1].instances.is_empty());
    }

    #[test]
    fn modern_since_is_absent_for_impossible_uptime() {
        let mut snapshot = modern_snapshot(modern_app(LifecycleType::Buildpack, &[]));
        let instance = |index, uptime| ProcessInstance {
            index,
            state: InstanceState::Running,
            uptime: Some(uptime),
            cpu: None,
            memory_usage: None,
            memory_quota: None,
            disk_usage: None,
            disk_quota: None,
            details: None,
        };
        snapshot.processes = vec![ProcessSnapshot {
            process: Process {
                guid: "web-guid".into(),
                process_type: "web".into(),
                instances: 3,
                memory_in_mb: None,
                disk_in_mb: None,
            },
            instances: vec![
                instance(0, u64::MAX / 2),
                instance(1, 10_000_000_000_000),
                instance(2, u64::MAX),
            ],
        }];

        let summary = normalize(Snapshot::Modern(snapshot), now());

        let since: Vec<_> = summary.processes[0]
            .instances
            .iter()
            .map(|i| i.since)
            .collect();
        assert_eq!(since, [None, None, None]);
    }
}
