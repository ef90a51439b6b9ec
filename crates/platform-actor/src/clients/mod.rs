//! # Typed Remote Clients
//!
//! The remote API exists in two protocol generations. Each one gets its own
//! trait and wire models; both report failures through the shared
//! [`CcError`] and return every call as an [`Outcome`](action_framework::Outcome)
//! so warnings survive failures.
//!
//! Actors hold clients as `Arc<dyn …>` so one connection can back several of
//! them. The transport behind the traits (HTTP, the in-memory
//! [`InMemoryPlatform`](crate::sim::InMemoryPlatform), the scriptable
//! [`fakes`](crate::fakes)) is interchangeable.

pub mod error;
pub mod legacy;
pub mod modern;

pub use error::CcError;
pub use legacy::LegacyClient;
pub use modern::ModernClient;

use std::sync::Arc;

pub type SharedLegacyClient = Arc<dyn LegacyClient>;
pub type SharedModernClient = Arc<dyn ModernClient>;
