//! # Action Framework
//!
//! This crate provides the substrate every client-side action is built from.
//! An *action* is one logical operation requested by the command layer (create
//! a buildpack, upload its bits, describe an application). It issues one or
//! more calls through a typed remote client and returns a single
//! [`Outcome`]: the value or error, plus every advisory warning the remote API
//! emitted along the way.
//!
//! ## Architecture Overview
//!
//! 1. **Envelope** ([`Outcome`], [`Warnings`]) - the `(value, warnings, error)`
//!    contract shared by remote clients and actions.
//! 2. **Streaming** ([`ProgressReporter`], [`UploadSession`], [`ProgressReader`]) -
//!    scoped acquisition of an upload payload with guaranteed release.
//! 3. **Ambient** ([`config`], [`tracing`], [`FrameworkError`]) - TOML settings,
//!    structured logging, framework-level failures.
//! 4. **Testing** ([`mock`]) - scriptable client stubs and a counting progress reporter.
//!
//! ## Writing an action
//!
//! An action owns one [`Warnings`] for its invocation and runs its body against
//! it, so an early `?` can never discard warnings gathered before the failure:
//!
//! ```rust
//! use action_framework::{Outcome, Warnings};
//!
//! fn remote_lookup(name: &str) -> Outcome<u32, String> {
//!     Outcome::ok(name.len() as u32, vec!["lookup is deprecated"])
//! }
//!
//! fn remote_fetch(id: u32) -> Outcome<String, String> {
//!     Outcome::err(format!("no such record {id}"), vec!["fetch is slow"])
//! }
//!
//! fn body(warnings: &mut Warnings, name: &str) -> Result<String, String> {
//!     let id = warnings.absorb(remote_lookup(name))?;
//!     warnings.absorb(remote_fetch(id))
//! }
//!
//! let mut warnings = Warnings::new();
//! let result = body(&mut warnings, "demo");
//! let outcome = Outcome::new(result, warnings);
//!
//! assert!(outcome.is_err());
//! assert_eq!(outcome.warnings, vec!["lookup is deprecated", "fetch is slow"]);
//! ```
//!
//! ## Concurrency Model
//!
//! Actions are sequential request/response flows: each remote call is awaited
//! before the next one is issued, nothing is spawned, and no state survives
//! between invocations.

pub mod config;
pub mod error;
pub mod mock;
pub mod outcome;
pub mod progress;
pub mod tracing;
pub mod warnings;

// Re-export core types for convenience
pub use error::FrameworkError;
pub use outcome::Outcome;
pub use progress::{
    FileProgressReporter, Payload, ProgressHandle, ProgressReader, ProgressReporter,
    UploadSession,
};
pub use warnings::Warnings;
