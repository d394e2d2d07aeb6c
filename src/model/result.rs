use indexmap::IndexMap;
use serde::Serialize;

/// Host port each module was exposed on by one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentResult {
    ports: IndexMap<String, u16>,
}

impl DeploymentResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, module_name: impl Into<String>, port: u16) {
        self.ports.insert(module_name.into(), port);
    }

    pub fn port(&self, module_name: &str) -> Option<u16> {
        self.ports.get(module_name).copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.ports.iter().map(|(name, port)| (name.as_str(), *port))
    }

    /// Merges another run's result in, later entries win.
    pub fn extend(&mut self, other: DeploymentResult) {
        self.ports.extend(other.ports);
    }
}
