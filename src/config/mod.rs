// Configuration loading and management.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::env::env_value;
use crate::lifecycle::naming::is_valid_profile;
use crate::ports::PortRange;

pub const PROD: &str = "prod";
#[allow(dead_code)]
pub const DEV: &str = "dev";
pub const TEST: &str = "test";

pub const DEFAULT_PROFILE: &str = "combined";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Orchestrator {
    #[serde(rename = "orchestrator")]
    pub orchestrator: OrchestratorBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorBox {
    pub env: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    pub logs: Option<Logs>,
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub ports: Ports,
    #[serde(default)]
    pub readiness: Readiness,
    #[serde(default)]
    pub mesh: Mesh,
    #[serde(default)]
    pub namespaces: Namespaces,
    #[serde(default)]
    pub sidecar: Sidecar,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub vault: Vault,
    /// Global module environment template.
    #[serde(default)]
    pub module_env: IndexMap<String, serde_json::Value>,
    /// Sidecar environment template.
    #[serde(default)]
    pub sidecar_env: IndexMap<String, serde_json::Value>,
    /// Module IDs per source registry.
    #[serde(default)]
    pub registries: IndexMap<String, Vec<String>>,
    /// Raw per-module entries, interpreted by the resolver.
    #[serde(default)]
    pub modules: IndexMap<String, Option<serde_json::Value>>,
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Runtime {
    /// Docker Engine API endpoint.
    pub host: String,
    #[serde(rename = "api_version")]
    pub api_version: Option<String>,
    pub network: String,
    pub platform: Option<String>,
    pub timeouts: Timeouts,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:2375".to_string(),
            api_version: None,
            network: "eureka".to_string(),
            platform: None,
            timeouts: Timeouts::default(),
        }
    }
}

/// Per-operation bounds on container-runtime calls.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub list: Duration,
    #[serde(with = "humantime_serde")]
    pub pull: Duration,
    #[serde(with = "humantime_serde")]
    pub deploy: Duration,
    #[serde(with = "humantime_serde")]
    pub undeploy: Duration,
    #[serde(with = "humantime_serde")]
    pub logs: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(10),
            pull: Duration::from_secs(5 * 60),
            deploy: Duration::from_secs(2 * 60),
            undeploy: Duration::from_secs(60),
            logs: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct Ports {
    pub start: u16,
    pub end: u16,
    #[serde(rename = "check_host")]
    pub check_host: bool,
}

impl Default for Ports {
    fn default() -> Self {
        let range = PortRange::default();
        Self {
            start: range.start,
            end: range.end,
            check_host: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct Readiness {
    #[serde(rename = "max_retries")]
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub wait: Duration,
    /// Bound on a single health call.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            max_retries: crate::readiness::DEFAULT_MAX_RETRIES,
            wait: crate::readiness::DEFAULT_WAIT,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Mesh {
    pub domain: String,
    #[serde(rename = "private_port")]
    pub private_port: u16,
    #[serde(rename = "debug_port")]
    pub debug_port: u16,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            domain: "eureka".to_string(),
            private_port: crate::model::spec::DEFAULT_PRIVATE_PORT,
            debug_port: 5005,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Namespaces {
    pub release: String,
    pub snapshot: String,
    #[serde(rename = "override")]
    pub override_namespace: Option<String>,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            release: "folioorg".to_string(),
            snapshot: "folioci".to_string(),
            override_namespace: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Sidecar {
    pub image: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Discovery {
    pub url: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Vault {
    /// Container whose boot log carries the root token.
    pub container: Option<String>,
    pub url: String,
}

impl Default for Vault {
    fn default() -> Self {
        Self {
            container: None,
            url: "http://vault.eureka:8200".to_string(),
        }
    }
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn profile(&self) -> &str;
    fn runtime(&self) -> &Runtime;
    fn ports(&self) -> &Ports;
    fn readiness(&self) -> &Readiness;
    fn mesh(&self) -> &Mesh;
    fn namespaces(&self) -> &Namespaces;
    fn sidecar(&self) -> &Sidecar;
    fn discovery(&self) -> &Discovery;
    fn vault(&self) -> &Vault;
    fn module_env(&self) -> IndexMap<String, String>;
    fn sidecar_env(&self) -> IndexMap<String, String>;
    fn registries(&self) -> &IndexMap<String, Vec<String>>;
    fn modules(&self) -> &IndexMap<String, Option<serde_json::Value>>;
}

// Config type alias for convenience
pub type Config = Orchestrator;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.orchestrator.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.orchestrator.env == PROD
    }

    fn is_test(&self) -> bool {
        self.orchestrator.env == TEST
    }

    fn profile(&self) -> &str {
        &self.orchestrator.profile
    }

    fn runtime(&self) -> &Runtime {
        &self.orchestrator.runtime
    }

    fn ports(&self) -> &Ports {
        &self.orchestrator.ports
    }

    fn readiness(&self) -> &Readiness {
        &self.orchestrator.readiness
    }

    fn mesh(&self) -> &Mesh {
        &self.orchestrator.mesh
    }

    fn namespaces(&self) -> &Namespaces {
        &self.orchestrator.namespaces
    }

    fn sidecar(&self) -> &Sidecar {
        &self.orchestrator.sidecar
    }

    fn discovery(&self) -> &Discovery {
        &self.orchestrator.discovery
    }

    fn vault(&self) -> &Vault {
        &self.orchestrator.vault
    }

    fn module_env(&self) -> IndexMap<String, String> {
        string_map(&self.orchestrator.module_env)
    }

    fn sidecar_env(&self) -> IndexMap<String, String> {
        string_map(&self.orchestrator.sidecar_env)
    }

    fn registries(&self) -> &IndexMap<String, Vec<String>> {
        &self.orchestrator.registries
    }

    fn modules(&self) -> &IndexMap<String, Option<serde_json::Value>> {
        &self.orchestrator.modules
    }
}

fn string_map(raw: &IndexMap<String, serde_json::Value>) -> IndexMap<String, String> {
    raw.iter()
        .filter_map(|(k, v)| env_value(v).map(|v| (k.clone(), v)))
        .collect()
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        let cfg = Self::from_yaml(&data)
            .with_context(|| format!("unmarshal yaml from {:?}", abs_path))?;

        Ok(cfg)
    }

    /// Parses and validates configuration from YAML text.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let mut cfg: Orchestrator = serde_yaml::from_str(data)?;

        let ports = cfg.orchestrator.ports;
        PortRange::new(ports.start, ports.end).context("invalid ports section")?;

        if cfg.orchestrator.readiness.max_retries == 0 {
            anyhow::bail!("readiness.max_retries must be at least 1");
        }

        if cfg.orchestrator.profile.trim().is_empty() {
            cfg.orchestrator.profile = default_profile();
        }
        if !is_valid_profile(&cfg.orchestrator.profile) {
            anyhow::bail!(
                "profile {:?} may only contain ascii letters, digits and underscores",
                cfg.orchestrator.profile
            );
        }

        if cfg.orchestrator.runtime.host.ends_with('/') {
            let trimmed = cfg.orchestrator.runtime.host.trim_end_matches('/').to_string();
            cfg.orchestrator.runtime.host = trimmed;
        }

        Ok(cfg)
    }

    pub fn port_range(&self) -> PortRange {
        PortRange {
            start: self.orchestrator.ports.start,
            end: self.orchestrator.ports.end,
        }
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
