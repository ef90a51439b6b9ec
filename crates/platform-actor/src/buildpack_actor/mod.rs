//! # Buildpack Actor
//!
//! Mutating buildpack actions over the legacy protocol: create the record,
//! stream its bits, or both in one go.
//!
//! ## Overview
//!
//! Every action follows the same shape. It owns one [`Warnings`] for the
//! invocation, runs its body against it, and packs the body's `Result` and the
//! warnings into an [`Outcome`]. Transport failures go through
//! [`translate`] exactly once; progress collaborator failures do not, because
//! no remote call happened.
//!
//! ## Usage
//!
//! ```rust
//! use action_framework::mock::FakeProgressReporter;
//! use platform_actor::buildpack_actor::BuildpackActor;
//! use platform_actor::clients::legacy::Buildpack;
//! use platform_actor::fakes::FakeLegacyClient;
//! use platform_actor::model::BuildpackCreate;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = FakeLegacyClient::new();
//!     client.create_buildpack.expect().return_ok(Buildpack {
//!         guid: "g-1".into(),
//!         name: "demo-bp".into(),
//!         ..Default::default()
//!     });
//!     client.upload_buildpack.expect().return_ok(());
//!
//!     let actor = BuildpackActor::new(Arc::new(client));
//!     let mut reporter = FakeProgressReporter::with_payload(b"zip".to_vec());
//!     let outcome = actor
//!         .create_and_upload_buildpack(
//!             BuildpackCreate::new("demo-bp", 1, true),
//!             Path::new("demo-bp.zip"),
//!             &mut reporter,
//!         )
//!         .await;
//!
//!     assert_eq!(outcome.value().map(|b| b.guid.as_str()), Some("g-1"));
//!     assert_eq!(reporter.terminate_count(), 1);
//! }
//! ```

use crate::clients::SharedLegacyClient;
use crate::error::{translate, ActionError};
use crate::model::{Buildpack, BuildpackCreate};
use action_framework::{Outcome, ProgressReporter, UploadSession, Warnings};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Actions on buildpacks.
#[derive(Clone)]
pub struct BuildpackActor {
    client: SharedLegacyClient,
}

impl BuildpackActor {
    pub fn new(client: SharedLegacyClient) -> Self {
        Self { client }
    }

    /// Creates a buildpack with no stack. The platform assigns one when bits
    /// are uploaded.
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_buildpack(
        &self,
        params: BuildpackCreate,
    ) -> Outcome<Buildpack, ActionError> {
        let mut warnings = Warnings::new();
        let result = self.create(&mut warnings, params).await;
        Outcome::new(result, warnings)
    }

    /// Streams the file at `path` as the bits of buildpack `guid`.
    ///
    /// `reporter` is initialized once and terminated exactly once, whatever
    /// happens to the upload.
    #[instrument(skip(self, path, reporter), fields(path = %path.display()))]
    pub async fn upload_buildpack(
        &self,
        guid: &str,
        path: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Outcome<(), ActionError> {
        let mut warnings = Warnings::new();
        let result = self.upload(&mut warnings, guid, guid, path, reporter).await;
        Outcome::new(result, warnings)
    }

    /// Creates a buildpack and uploads its bits. Warnings from the create call
    /// come first and are kept when the upload fails.
    #[instrument(
        skip(self, params, path, reporter),
        fields(name = %params.name, path = %path.display())
    )]
    pub async fn create_and_upload_buildpack(
        &self,
        params: BuildpackCreate,
        path: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Outcome<Buildpack, ActionError> {
        let mut warnings = Warnings::new();
        let result = self
            .create_then_upload(&mut warnings, params, path, reporter)
            .await;
        Outcome::new(result, warnings)
    }

    async fn create_then_upload(
        &self,
        warnings: &mut Warnings,
        params: BuildpackCreate,
        path: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Buildpack, ActionError> {
        let buildpack = self.create(warnings, params).await?;
        self.upload(warnings, &buildpack.guid, &buildpack.name, path, reporter).await?;
        Ok(buildpack)
    }

    async fn create(
        &self,
        warnings: &mut Warnings,
        params: BuildpackCreate,
    ) -> Result<Buildpack, ActionError> {
        debug!(position = params.position, enabled = params.enabled, "Creating buildpack");
        let name = params.name.clone();

        let created = warnings
            .absorb(self.client.create_buildpack(params.into()).await)
            .map_err(|e| {
                let error = translate(e, &name);
                warn!(%error, "Buildpack creation failed");
                error
            })?;

        info!(guid = %created.guid, "Buildpack created");
        Ok(created.into())
    }

    /// `subject` names the buildpack in translated errors: its name when the
    /// caller knows it, otherwise the GUID.
    async fn upload(
        &self,
        warnings: &mut Warnings,
        guid: &str,
        subject: &str,
        path: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<(), ActionError> {
        let mut session = UploadSession::open(reporter, path).map_err(|e| {
            warn!(error = %e, "Could not open upload payload");
            ActionError::from(e)
        })?;
        let length = session.length();
        debug!(guid, length, "Uploading buildpack bits");

        warnings
            .absorb(
                self.client
                    .upload_buildpack(guid, path, session.take_payload(), length)
                    .await,
            )
            .map_err(|e| {
                let error = translate(e, subject);
                warn!(%error, "Buildpack upload failed");
                error
            })?;

        info!(guid, "Buildpack bits uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::legacy;
    use crate::clients::CcError;
    use crate::fakes::{FakeLegacyClient, UploadCall};
    use action_framework::mock::FakeProgressReporter;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn actor(client: &FakeLegacyClient) -> BuildpackActor {
        BuildpackActor::new(Arc::new(client.clone()))
    }

    fn created(guid: &str, name: &str) -> legacy::Buildpack {
        legacy::Buildpack {
            guid: guid.into(),
            name: name.into(),
            position: 42,
            enabled: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_returns_buildpack_and_client_warnings() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .with_warnings(["w1"])
            .return_ok(created("g-1", "demo-bp"));

        let outcome = actor(&client)
            .create_buildpack(BuildpackCreate::new("demo-bp", 42, true))
            .await;

        assert_eq!(outcome.value().map(|b| b.guid.as_str()), Some("g-1"));
        assert_eq!(outcome.warnings, vec!["w1"]);
        assert!(outcome.error().is_none());

        let sent = client.create_buildpack.args_for_call(0).unwrap();
        assert_eq!(sent.name, "demo-bp");
        assert_eq!(sent.position, 42);
        assert!(sent.enabled);
        assert_eq!(sent.stack, None);
        client.create_buildpack.verify();
    }

    #[tokio::test]
    async fn create_conflict_without_stack_names_the_buildpack() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .with_warnings(["some-create-warning"])
            .return_err(CcError::BuildpackAlreadyExistsWithoutStack {
                message: "raw".into(),
            });

        let outcome = actor(&client)
            .create_buildpack(BuildpackCreate::new("demo-bp", 1, true))
            .await;

        assert_eq!(
            outcome.error(),
            Some(&ActionError::AlreadyExistsWithoutStack("demo-bp".into()))
        );
        assert_eq!(outcome.warnings, vec!["some-create-warning"]);
    }

    #[tokio::test]
    async fn create_name_taken() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .return_err(CcError::BuildpackNameTaken {
                message: "raw".into(),
            });

        let outcome = actor(&client)
            .create_buildpack(BuildpackCreate::new("demo-bp", 1, true))
            .await;

        assert_eq!(outcome.error(), Some(&ActionError::NameTaken("demo-bp".into())));
    }

    #[tokio::test]
    async fn create_unrecognized_error_is_opaque() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .with_warnings(["w1"])
            .return_err(CcError::Request("kaboom".into()));

        let outcome = actor(&client)
            .create_buildpack(BuildpackCreate::new("demo-bp", 1, true))
            .await;

        assert_eq!(outcome.error(), Some(&ActionError::Opaque("kaboom".into())));
        assert_eq!(outcome.warnings, vec!["w1"]);
    }

    #[tokio::test]
    async fn upload_passes_zero_length_through_and_terminates_once() {
        let client = FakeLegacyClient::new();
        client.upload_buildpack.expect().with_warnings(["w2"]).return_ok(());
        let mut reporter = FakeProgressReporter::with_payload(Vec::new());

        let outcome = actor(&client)
            .upload_buildpack("g-1", Path::new("empty.zip"), &mut reporter)
            .await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.warnings, vec!["w2"]);
        assert_eq!(
            client.upload_buildpack.calls(),
            vec![UploadCall {
                guid: "g-1".into(),
                path: PathBuf::from("empty.zip"),
                bytes: Vec::new(),
                length: 0,
            }]
        );
        assert_eq!(reporter.initialized_paths(), [PathBuf::from("empty.zip")]);
        assert_eq!(reporter.terminate_count(), 1);
    }

    #[tokio::test]
    async fn upload_failure_is_translated_and_still_terminates() {
        let message = "The buildpack name demo-bp is already in use with stack cflinuxfs2";
        let client = FakeLegacyClient::new();
        client
            .upload_buildpack
            .expect()
            .with_warnings(["upload-warning"])
            .return_err(CcError::BuildpackAlreadyExistsForStack {
                message: message.into(),
            });
        let mut reporter = FakeProgressReporter::with_payload(b"bits".to_vec());

        let outcome = actor(&client)
            .upload_buildpack("g-1", Path::new("bp.zip"), &mut reporter)
            .await;

        assert_eq!(
            outcome.error(),
            Some(&ActionError::AlreadyExistsForStack {
                message: message.into()
            })
        );
        assert_eq!(outcome.warnings, vec!["upload-warning"]);
        assert_eq!(reporter.terminate_count(), 1);
    }

    #[tokio::test]
    async fn upload_initialize_failure_skips_the_remote_call() {
        let client = FakeLegacyClient::new();
        let mut reporter = FakeProgressReporter::failing("no such file");

        let outcome = actor(&client)
            .upload_buildpack("g-1", Path::new("missing.zip"), &mut reporter)
            .await;

        assert!(matches!(
            outcome.error(),
            Some(ActionError::Opaque(m)) if m.contains("no such file")
        ));
        assert!(outcome.warnings.is_empty());
        assert_eq!(client.upload_buildpack.call_count(), 0);
        assert_eq!(reporter.initialize_count(), 1);
        assert_eq!(reporter.terminate_count(), 0);
    }

    #[tokio::test]
    async fn upload_declared_length_is_not_recomputed() {
        let client = FakeLegacyClient::new();
        client.upload_buildpack.expect().return_ok(());
        let mut reporter = FakeProgressReporter::with_payload(b"abc".to_vec()).declaring_length(0);

        actor(&client)
            .upload_buildpack("g-1", Path::new("bp.zip"), &mut reporter)
            .await;

        let call = client.upload_buildpack.args_for_call(0).unwrap();
        assert_eq!(call.length, 0);
        assert_eq!(call.bytes, b"abc");
    }

    #[tokio::test]
    async fn create_and_upload_keeps_create_warnings_on_upload_failure() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .with_warnings(["create-warning"])
            .return_ok(created("g-7", "demo-bp"));
        client
            .upload_buildpack
            .expect()
            .with_warnings(["upload-warning"])
            .return_err(CcError::Request("connection reset".into()));
        let mut reporter = FakeProgressReporter::with_payload(b"bits".to_vec());

        let outcome = actor(&client)
            .create_and_upload_buildpack(
                BuildpackCreate::new("demo-bp", 1, true),
                Path::new("bp.zip"),
                &mut reporter,
            )
            .await;

        assert_eq!(outcome.error(), Some(&ActionError::Opaque("connection reset".into())));
        assert_eq!(outcome.warnings, vec!["create-warning", "upload-warning"]);
        assert_eq!(client.upload_buildpack.args_for_call(0).unwrap().guid, "g-7");
        assert_eq!(reporter.terminate_count(), 1);
    }

    #[tokio::test]
    async fn create_and_upload_conflict_names_the_buildpack() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .return_ok(created("g-8", "demo-bp"));
        client
            .upload_buildpack
            .expect()
            .return_err(CcError::BuildpackNameTaken {
                message: "taken".into(),
            });
        let mut reporter = FakeProgressReporter::with_payload(b"bits".to_vec());

        let outcome = actor(&client)
            .create_and_upload_buildpack(
                BuildpackCreate::new("demo-bp", 1, true),
                Path::new("bp.zip"),
                &mut reporter,
            )
            .await;

        assert_eq!(outcome.error(), Some(&ActionError::NameTaken("demo-bp".into())));
        assert_eq!(client.upload_buildpack.args_for_call(0).unwrap().guid, "g-8");
        assert_eq!(reporter.terminate_count(), 1);
    }

    #[tokio::test]
    async fn create_failure_never_opens_the_payload() {
        let client = FakeLegacyClient::new();
        client
            .create_buildpack
            .expect()
            .return_err(CcError::BuildpackNameTaken {
                message: "taken".into(),
            });
        let mut reporter = FakeProgressReporter::with_payload(b"bits".to_vec());

        let outcome = actor(&client)
            .create_and_upload_buildpack(
                BuildpackCreate::new("demo-bp", 1, true),
                Path::new("bp.zip"),
                &mut reporter,
            )
            .await;

        assert_eq!(outcome.error(), Some(&ActionError::NameTaken("demo-bp".into())));
        assert_eq!(reporter.initialize_count(), 0);
        assert_eq!(reporter.terminate_count(), 0);
    }
}
