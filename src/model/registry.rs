// Package model derives module identity from registry-supplied module IDs.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Control-plane modules, deployed in their own pass and never paired with a sidecar.
pub const MANAGEMENT_PREFIX: &str = "mgr-";
/// Gateway-facing modules whose sidecar name equals the module name.
pub const EDGE_PREFIX: &str = "edge";
pub const SIDECAR_SUFFIX: &str = "-sc";

static MODULE_ID: OnceLock<Regex> = OnceLock::new();

fn module_id_pattern() -> &'static Regex {
    MODULE_ID.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)-(?P<version>\d+\.\d+\.\d+\S*)$").expect("static module id pattern")
    })
}

pub fn is_management(name: &str) -> bool {
    name.starts_with(MANAGEMENT_PREFIX)
}

pub fn is_edge(name: &str) -> bool {
    name.starts_with(EDGE_PREFIX)
}

/// Identity of a module as listed by a registry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RegistryModule {
    id: String,
    name: String,
    version: Option<String>,
    sidecar_name: String,
}

impl RegistryModule {
    /// Parses `mod-users-19.3.0` into name `mod-users` and version `19.3.0`.
    pub fn from_id(id: &str) -> Self {
        let id = id.trim();
        let (name, version) = match module_id_pattern().captures(id) {
            Some(caps) => (
                caps["name"].to_string(),
                Some(caps["version"].to_string()),
            ),
            None => (id.to_string(), None),
        };
        let sidecar_name = sidecar_name_of(&name);
        Self {
            id: id.to_string(),
            name,
            version,
            sidecar_name,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn sidecar_name(&self) -> &str {
        &self.sidecar_name
    }

    pub fn is_management(&self) -> bool {
        is_management(&self.name)
    }

    pub fn is_edge(&self) -> bool {
        is_edge(&self.name)
    }
}

pub fn sidecar_name_of(name: &str) -> String {
    if is_edge(name) {
        name.to_string()
    } else {
        format!("{}{}", name, SIDECAR_SUFFIX)
    }
}
