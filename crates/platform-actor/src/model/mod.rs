//! Domain entities and display models returned by the actors.

pub mod application;
pub mod buildpack;

pub use application::*;
pub use buildpack::*;
