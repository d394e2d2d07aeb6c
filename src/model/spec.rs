// Package model defines the resolved deployment intent of a single module.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Platform default in-container listen port.
pub const DEFAULT_PRIVATE_PORT: u16 = 8081;

pub const DEFAULT_CPU_COUNT: i64 = 1;
pub const DEFAULT_MEMORY_RESERVATION_MIB: i64 = 128;
pub const DEFAULT_MEMORY_MIB: i64 = 750;
pub const DEFAULT_MEMORY_SWAP_MIB: i64 = -1;

/// Container resource limits. Memory values are MiB, `-1` swap means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleResources {
    pub cpu_count: i64,
    pub memory_reservation: i64,
    pub memory: i64,
    pub memory_swap: i64,
    pub oom_kill_disable: bool,
}

impl Default for ModuleResources {
    fn default() -> Self {
        Self {
            cpu_count: DEFAULT_CPU_COUNT,
            memory_reservation: DEFAULT_MEMORY_RESERVATION_MIB,
            memory: DEFAULT_MEMORY_MIB,
            memory_swap: DEFAULT_MEMORY_SWAP_MIB,
            oom_kill_disable: false,
        }
    }
}

/// Resolved deployment intent for one module.
///
/// Host ports are `0` when the corresponding container is not deployed. When
/// `deploy_sidecar` is set all four host ports are non-zero and distinct
/// within the resolution batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSpec {
    pub deploy_module: bool,
    pub deploy_sidecar: bool,
    pub use_vault: bool,
    pub use_okapi_url: bool,
    pub disable_system_user: bool,
    /// `None` means the descriptor is fetched from the registry.
    pub local_descriptor_path: Option<PathBuf>,
    #[serde(skip)]
    pub local_descriptor: Option<serde_json::Value>,
    pub version: Option<String>,
    pub module_server_port: u16,
    pub module_debug_port: u16,
    pub sidecar_server_port: u16,
    pub sidecar_debug_port: u16,
    pub private_port: u16,
    pub env: IndexMap<String, String>,
    pub resources: ModuleResources,
    pub volumes: Vec<String>,
}

impl ModuleSpec {
    /// A spec that deploys nothing and holds no ports.
    pub fn disabled() -> Self {
        Self {
            deploy_module: false,
            deploy_sidecar: false,
            use_vault: false,
            use_okapi_url: false,
            disable_system_user: false,
            local_descriptor_path: None,
            local_descriptor: None,
            version: None,
            module_server_port: 0,
            module_debug_port: 0,
            sidecar_server_port: 0,
            sidecar_debug_port: 0,
            private_port: DEFAULT_PRIVATE_PORT,
            env: IndexMap::new(),
            resources: ModuleResources::default(),
            volumes: Vec::new(),
        }
    }

    pub fn has_sidecar(&self) -> bool {
        self.deploy_module && self.deploy_sidecar
    }

    /// Host ports in allocation order: module server, module debug, sidecar server, sidecar debug.
    pub fn host_ports(&self) -> [u16; 4] {
        [
            self.module_server_port,
            self.module_debug_port,
            self.sidecar_server_port,
            self.sidecar_debug_port,
        ]
    }
}
