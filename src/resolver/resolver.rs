// Package resolver converts raw module configuration into typed specs.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::typed::{self, Object};
use super::volumes;
use super::ResolveError;
use crate::model::{is_edge, is_management, ModuleResources, ModuleSpec};
use crate::ports::PortAllocator;

const DEPLOY_MODULE: &str = "deploy_module";
const DEPLOY_SIDECAR: &str = "deploy_sidecar";
const USE_VAULT: &str = "use_vault";
const USE_OKAPI_URL: &str = "use_okapi_url";
const DISABLE_SYSTEM_USER: &str = "disable_system_user";
const LOCAL_DESCRIPTOR_PATH: &str = "local_descriptor_path";
const VERSION: &str = "version";
const PORT: &str = "port";
const PRIVATE_PORT: &str = "private_port";
const ENV: &str = "env";
const RESOURCES: &str = "resources";
const VOLUMES: &str = "volumes";

pub struct ModuleSpecResolver {
    ports: Arc<PortAllocator>,
    default_private_port: u16,
}

impl ModuleSpecResolver {
    pub fn new(ports: Arc<PortAllocator>, default_private_port: u16) -> Self {
        Self {
            ports,
            default_private_port,
        }
    }

    /// Resolves every configured module in configuration order. The first
    /// error aborts the batch and no partial result is returned.
    ///
    /// Explicit ports are reserved up front so the allocator never hands them
    /// to a module listed earlier.
    pub fn resolve_all(
        &self,
        modules: &IndexMap<String, Option<Value>>,
    ) -> Result<IndexMap<String, ModuleSpec>, ResolveError> {
        let reserved = self.reserve_explicit_ports(modules)?;
        let mut specs = IndexMap::with_capacity(modules.len());
        for (name, raw) in modules {
            let spec = self.resolve_entry(name, raw.as_ref(), &reserved)?;
            debug!(
                component = "resolver",
                event = "module_resolved",
                module = %name,
                deploy_module = spec.deploy_module,
                deploy_sidecar = spec.deploy_sidecar,
                port = spec.module_server_port,
                "module spec resolved"
            );
            specs.insert(name.clone(), spec);
        }
        Ok(specs)
    }

    /// Resolves one module entry. A missing or `null` entry yields defaults.
    pub fn resolve(&self, name: &str, raw: Option<&Value>) -> Result<ModuleSpec, ResolveError> {
        self.resolve_entry(name, raw, &HashSet::new())
    }

    fn reserve_explicit_ports(
        &self,
        modules: &IndexMap<String, Option<Value>>,
    ) -> Result<HashSet<u16>, ResolveError> {
        let mut reserved = HashSet::new();
        for (name, raw) in modules {
            let Some(port) = raw.as_ref().and_then(Value::as_object).and_then(explicit_port) else {
                continue;
            };
            if !self.ports.reserve(port) {
                return Err(ResolveError::PortConflict {
                    module: name.clone(),
                    port,
                });
            }
            reserved.insert(port);
        }
        Ok(reserved)
    }

    fn resolve_entry(
        &self,
        name: &str,
        raw: Option<&Value>,
        reserved: &HashSet<u16>,
    ) -> Result<ModuleSpec, ResolveError> {
        match raw {
            None | Some(Value::Null) => self.defaults(name),
            Some(Value::Object(obj)) => self.typed(name, obj, reserved),
            Some(other) => {
                warn!(
                    component = "resolver",
                    event = "entry_not_an_object",
                    module = %name,
                    value = %other,
                    "module entry is not a mapping, using defaults"
                );
                self.typed(name, &Object::new(), reserved)
            }
        }
    }

    fn defaults(&self, name: &str) -> Result<ModuleSpec, ResolveError> {
        let mut spec = ModuleSpec::disabled();
        spec.deploy_module = true;
        spec.deploy_sidecar = sidecar_allowed(name);
        spec.private_port = self.default_private_port;
        spec.module_server_port = self.allocate_one(name)?;
        self.allocate_sidecar_ports(name, &mut spec)?;
        Ok(spec)
    }

    fn typed(&self, name: &str, obj: &Object, reserved: &HashSet<u16>) -> Result<ModuleSpec, ResolveError> {
        let mut spec = ModuleSpec::disabled();
        spec.deploy_module = typed::bool_or(obj, DEPLOY_MODULE, true);
        spec.deploy_sidecar = typed::bool_or(obj, DEPLOY_SIDECAR, true) && sidecar_allowed(name);
        spec.use_vault = typed::bool_or(obj, USE_VAULT, false);
        spec.use_okapi_url = typed::bool_or(obj, USE_OKAPI_URL, false);
        spec.disable_system_user = typed::bool_or(obj, DISABLE_SYSTEM_USER, false);
        spec.version = typed::version_of(obj, VERSION);
        spec.private_port = typed::u16_or(obj, PRIVATE_PORT, self.default_private_port);
        spec.env = typed::string_map_of(obj, ENV);
        spec.resources = resources(obj);

        if let Some(raw_path) = typed::str_of(obj, LOCAL_DESCRIPTOR_PATH) {
            let (path, descriptor) = load_local_descriptor(name, raw_path)?;
            spec.local_descriptor_path = Some(path);
            spec.local_descriptor = Some(descriptor);
        }

        spec.volumes = typed::string_list_of(obj, VOLUMES)
            .iter()
            .map(|bind| checked_volume(name, bind))
            .collect::<Result<Vec<_>, _>>()?;

        spec.module_server_port = if !spec.deploy_module {
            0
        } else if let Some(port) = explicit_port(obj) {
            if !reserved.contains(&port) && !self.ports.reserve(port) {
                return Err(ResolveError::PortConflict {
                    module: name.to_string(),
                    port,
                });
            }
            port
        } else {
            self.allocate_one(name)?
        };

        self.allocate_sidecar_ports(name, &mut spec)?;
        Ok(spec)
    }

    /// Module debug, sidecar server and sidecar debug ports, in that order.
    fn allocate_sidecar_ports(&self, name: &str, spec: &mut ModuleSpec) -> Result<(), ResolveError> {
        if !spec.has_sidecar() {
            return Ok(());
        }
        let ports = self.ports.allocate(3).map_err(|source| ResolveError::Port {
            module: name.to_string(),
            source,
        })?;
        spec.module_debug_port = ports[0];
        spec.sidecar_server_port = ports[1];
        spec.sidecar_debug_port = ports[2];
        Ok(())
    }

    fn allocate_one(&self, name: &str) -> Result<u16, ResolveError> {
        self.ports.allocate_one().map_err(|source| ResolveError::Port {
            module: name.to_string(),
            source,
        })
    }
}

/// Configured host port of a module that is actually deployed.
fn explicit_port(obj: &Object) -> Option<u16> {
    if !typed::bool_or(obj, DEPLOY_MODULE, true) {
        return None;
    }
    typed::u16_of(obj, PORT)
}

fn sidecar_allowed(name: &str) -> bool {
    !is_management(name) && !is_edge(name)
}

fn resources(obj: &Object) -> ModuleResources {
    let defaults = ModuleResources::default();
    let Some(res) = typed::object_of(obj, RESOURCES) else {
        return defaults;
    };
    ModuleResources {
        cpu_count: typed::i64_or(res, "cpu_count", defaults.cpu_count),
        memory_reservation: typed::i64_or(res, "memory_reservation", defaults.memory_reservation),
        memory: typed::i64_or(res, "memory", defaults.memory),
        memory_swap: typed::i64_or(res, "memory_swap", defaults.memory_swap),
        oom_kill_disable: typed::bool_or(res, "oom_kill_disable", defaults.oom_kill_disable),
    }
}

fn load_local_descriptor(module: &str, raw_path: &str) -> Result<(PathBuf, Value), ResolveError> {
    let path = PathBuf::from(volumes::expand_home(raw_path));
    if !path.is_file() {
        return Err(ResolveError::LocalDescriptorNotFound {
            module: module.to_string(),
            path,
        });
    }

    let invalid = |reason: String| ResolveError::InvalidLocalDescriptor {
        module: module.to_string(),
        path: path.clone(),
        reason,
    };
    let data = std::fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
    let descriptor: Value = serde_json::from_str(&data).map_err(|e| invalid(e.to_string()))?;
    if !descriptor.is_object() {
        return Err(invalid("top-level value is not an object".to_string()));
    }
    Ok((path, descriptor))
}

fn checked_volume(module: &str, bind: &str) -> Result<String, ResolveError> {
    let (bind, host_path) = volumes::expand_bind(bind);
    if !host_path.exists() {
        return Err(ResolveError::VolumeNotFound {
            module: module.to_string(),
            volume: bind,
        });
    }
    Ok(bind)
}
