//! # Platform Action Layer
//!
//! Client-side actions against a resource-management API that exists in two
//! protocol generations. This library exposes the core modules of the
//! application for the binary and for integration testing.
//!
//! - [`clients`] - wire models and typed client traits per generation
//! - [`error`] - [`ActionError`](error::ActionError) and the transport error translator
//! - [`model`] - version-independent domain and display models
//! - [`buildpack_actor`] - create and upload buildpacks
//! - [`app_summary_actor`] - describe applications across generations
//! - [`lifecycle`] - settings, API capability and actor wiring
//! - [`fakes`], [`sim`] - scriptable fake clients and an in-memory platform

pub mod app_summary_actor;
pub mod buildpack_actor;
pub mod clients;
pub mod error;
pub mod fakes;
pub mod lifecycle;
pub mod model;
pub mod sim;
