// Package model describes a single module+sidecar pair being rewired.

use std::sync::Arc;

use super::{Containers, ModuleSpec, RegistryModule};

/// Fresh host ports assigned to a pair by a pairing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairPorts {
    pub module_server: u16,
    pub module_debug: u16,
    pub sidecar_server: u16,
    pub sidecar_debug: u16,
}

/// Identity and live state of one module+sidecar pair.
///
/// A pair is a value: every flow step consumes it and returns the updated pair,
/// so no step observes a half-updated state.
#[derive(Debug, Clone)]
pub struct ModulePair {
    module: RegistryModule,
    /// `None` means the default in-mesh address of the module.
    module_url: Option<String>,
    /// `None` means the default in-mesh address of the sidecar.
    sidecar_url: Option<String>,
    spec: ModuleSpec,
    containers: Arc<Containers>,
}

impl ModulePair {
    pub fn new(module: RegistryModule, spec: ModuleSpec, containers: Arc<Containers>) -> Self {
        Self {
            module,
            module_url: None,
            sidecar_url: None,
            spec,
            containers,
        }
    }

    /// Builds the pair for `module_name` out of a batch snapshot.
    pub fn from_containers(containers: Arc<Containers>, module_name: &str) -> Option<Self> {
        let module = containers.find_module(module_name)?.clone();
        let spec = containers.spec(module_name)?.clone();
        Some(Self::new(module, spec, containers))
    }

    pub fn with_module_url(mut self, url: Option<String>) -> Self {
        self.module_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_sidecar_url(mut self, url: Option<String>) -> Self {
        self.sidecar_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_ports(mut self, ports: PairPorts) -> Self {
        self.spec.module_server_port = ports.module_server;
        self.spec.module_debug_port = ports.module_debug;
        self.spec.sidecar_server_port = ports.sidecar_server;
        self.spec.sidecar_debug_port = ports.sidecar_debug;
        self
    }

    pub fn with_version(mut self, version: String) -> Self {
        self.spec.version = Some(version);
        self
    }

    /// Module ID as registered with discovery: `<name>-<version>`, or the plain
    /// registry id when no version is known.
    pub fn id(&self) -> String {
        match self.version() {
            Some(version) => format!("{}-{}", self.module.name(), version),
            None => self.module.id().to_string(),
        }
    }

    pub fn module(&self) -> &RegistryModule {
        &self.module
    }

    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    /// Spec override first, then the registry version.
    pub fn version(&self) -> Option<&str> {
        self.spec.version.as_deref().or(self.module.version())
    }

    pub fn module_url(&self) -> Option<&str> {
        self.module_url.as_deref()
    }

    pub fn sidecar_url(&self) -> Option<&str> {
        self.sidecar_url.as_deref()
    }

    pub fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    pub fn containers(&self) -> &Arc<Containers> {
        &self.containers
    }

    pub fn ports(&self) -> PairPorts {
        PairPorts {
            module_server: self.spec.module_server_port,
            module_debug: self.spec.module_debug_port,
            sidecar_server: self.spec.sidecar_server_port,
            sidecar_debug: self.spec.sidecar_debug_port,
        }
    }
}
