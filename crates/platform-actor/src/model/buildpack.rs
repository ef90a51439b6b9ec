/// A named, ordered unit of build logic known to the remote platform.
///
/// Values of this type are only ever produced from a remote response: the
/// `guid` is assigned by the server when creation succeeds, and every later
/// field change round-trips through the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buildpack {
    pub guid: String,
    pub name: String,
    /// Rank among buildpacks evaluated at detection time (1 is first).
    pub position: i32,
    pub enabled: bool,
    pub stack: Option<String>,
    pub locked: Option<bool>,
}

/// Payload for creating a new buildpack.
///
/// No stack is sent: the platform assigns one when the bits are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildpackCreate {
    pub name: String,
    pub position: i32,
    pub enabled: bool,
}

impl BuildpackCreate {
    pub fn new(name: impl Into<String>, position: i32, enabled: bool) -> Self {
        Self {
            name: name.into(),
            position,
            enabled,
        }
    }
}
