//! # Platform Actor Demo
//!
//! Drives the action layer end to end against the in-memory platform:
//!
//! 1. Load [`Settings`] (optional TOML path as the first argument) and set up tracing.
//! 2. Wire an [`ActionSystem`] for the negotiated API capability.
//! 3. Create a buildpack and upload its bits, then describe a seeded application.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p platform-actor -- settings.toml
//! ```

use action_framework::tracing::setup_tracing_with;
use action_framework::FileProgressReporter;
use chrono::Utc;
use platform_actor::lifecycle::{ActionSystem, Settings};
use platform_actor::model::BuildpackCreate;
use platform_actor::sim::{InMemoryPlatform, SimApp};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&PathBuf::from(path)).map_err(|e| e.to_string())?,
        None => Settings::default().with_env_overrides(),
    };
    setup_tracing_with(&settings.logging.filter);

    info!(api_version = ?settings.api.version, "Starting platform action demo");

    let platform = Arc::new(
        InMemoryPlatform::new().with_app(
            SimApp::buildpack("demo-app", &["ruby_buildpack", "go_buildpack"])
                .with_stack("cflinuxfs3")
                .with_process("web", 2, 256)
                .with_process("worker", 1, 128)
                .with_route("demo-app.apps.example.com")
                .staged_at(Utc::now()),
        ),
    );
    let system = ActionSystem::from_settings(&settings, platform.clone(), platform.clone())
        .map_err(|e| e.to_string())?;

    let bits = std::env::temp_dir().join("demo-buildpack.zip");
    tokio::fs::write(&bits, b"PK demo buildpack bits")
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("buildpack_demo");
    let created = async {
        let mut reporter = FileProgressReporter::new();
        system
            .buildpacks
            .create_and_upload_buildpack(
                BuildpackCreate::new("demo-bp", 1, true),
                &bits,
                &mut reporter,
            )
            .await
    }
    .instrument(span)
    .await;

    for warning in &created.warnings {
        warn!(%warning, "Platform warning");
    }
    match &created.result {
        Ok(buildpack) => {
            let stack = platform
                .buildpacks()
                .into_iter()
                .find(|b| b.guid == buildpack.guid)
                .and_then(|b| b.stack);
            info!(guid = %buildpack.guid, ?stack, "Buildpack ready");
        }
        Err(e) => error!(error = %e, "Buildpack setup failed"),
    }

    let span = tracing::info_span!("describe_demo");
    let described = system.apps.describe("demo-app").instrument(span).await;
    match described.result {
        Ok(summary) => {
            info!(
                name = %summary.name,
                state = %summary.state,
                buildpacks = ?summary.buildpacks(),
                stack = ?summary.stack,
                routes = ?summary.routes,
                "Application summary"
            );
            for process in &summary.processes {
                info!(
                    process_type = %process.process_type,
                    running = process.running_instances(),
                    desired = process.desired_instances,
                    "Process"
                );
            }
        }
        Err(e) => error!(error = %e, "Describe failed"),
    }

    remove_bits(&bits).await;
    info!("Demo completed");
    Ok(())
}

/// Deletes the demo payload, logging instead of failing when it cannot.
async fn remove_bits(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Could not remove demo buildpack file");
            false
        }
    }
}
