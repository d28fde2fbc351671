//! Container Registry
//!
//! `#[flux::container]` submits a [`ContainerDef`] through `inventory`; a
//! [`Unit`] collects them (or explicit [`Registration`]s) for discovery.

use crate::model::Registration;

/// Static registry record submitted by `#[flux::container]`
#[derive(Debug, Clone)]
pub struct ContainerDef {
    /// Qualified container name
    pub name: &'static str,
    /// Builds the container's registration
    pub build: fn() -> Registration,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Module path
    pub module_path: &'static str,
}

inventory::collect!(ContainerDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<ContainerDef> {}
};

/// Every registered container definition, in link order
pub fn registered() -> impl Iterator<Item = &'static ContainerDef> {
    inventory::iter::<ContainerDef>.into_iter()
}

/// The loaded collection of containers examined by discovery
#[derive(Debug, Default)]
pub struct Unit {
    registrations: Vec<Registration>,
}

impl Unit {
    /// Create an empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a unit from every container registered in this binary
    pub fn from_registry() -> Self {
        let registrations = registered()
            .map(|def| {
                tracing::trace!(container = def.name, file = def.file, line = def.line, "registered");
                (def.build)()
            })
            .collect();
        Self { registrations }
    }

    /// Add a registration
    pub fn with(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Add a registration in place
    pub fn push(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    /// Number of registered containers
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no container is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub(crate) fn into_registrations(self) -> Vec<Registration> {
        self.registrations
    }
}

impl FromIterator<Registration> for Unit {
    fn from_iter<I: IntoIterator<Item = Registration>>(iter: I) -> Self {
        Self {
            registrations: iter.into_iter().collect(),
        }
    }
}
