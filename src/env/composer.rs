// Package env composes container environments from feature flags and templates.
//
// Every composition appends; callers concatenate them in a fixed order per
// container kind (see compose_module / compose_sidecar).

use indexmap::IndexMap;
use tracing::warn;

use super::EnvList;
use crate::config::Mesh;
use crate::model::{Containers, ModuleSpec, RegistryModule};

/// Framework variable overriding the sidecar listen port.
pub const FRAMEWORK_PORT_OVERRIDE: &str = "QUARKUS_HTTP_PORT";

/// Identity a sidecar advertises for itself and the module it fronts.
#[derive(Debug, Clone)]
pub struct SidecarIdentity<'a> {
    pub module_name: &'a str,
    pub module_version: Option<&'a str>,
    /// `None` synthesizes the in-mesh address.
    pub module_url: Option<&'a str>,
    pub sidecar_name: &'a str,
    /// `None` synthesizes the in-mesh address.
    pub sidecar_url: Option<&'a str>,
    pub private_port: u16,
}

#[derive(Debug, Clone)]
pub struct EnvironmentComposer {
    domain: String,
    default_private_port: u16,
    debug_port: u16,
    vault_url: String,
}

impl EnvironmentComposer {
    pub fn new(mesh: &Mesh, vault_url: impl Into<String>) -> Self {
        Self {
            domain: mesh.domain.clone(),
            default_private_port: mesh.private_port,
            debug_port: mesh.debug_port,
            vault_url: vault_url.into(),
        }
    }

    /// In-mesh DNS-style address of a container.
    pub fn in_mesh_url(&self, name: &str, private_port: u16) -> String {
        format!("http://{}.{}:{}", name, self.domain, private_port)
    }

    pub fn in_mesh_host(&self, name: &str) -> String {
        format!("{}.{}", name, self.domain)
    }

    pub fn debug_port(&self) -> u16 {
        self.debug_port
    }

    pub fn template(&self, env: &mut EnvList, template: &IndexMap<String, String>) {
        for (key, value) in template {
            env.push(key, value);
        }
    }

    pub fn debug(&self, env: &mut EnvList) {
        env.push(
            "JAVA_OPTIONS",
            format!(
                "-agentlib:jdwp=transport=dt_socket,server=y,suspend=n,address=*:{}",
                self.debug_port
            ),
        );
    }

    pub fn vault(&self, env: &mut EnvList, token: &str) {
        env.push("SECRET_STORE_TYPE", "VAULT");
        env.push("SECRET_STORE_VAULT_TOKEN", token);
        env.push("SECRET_STORE_VAULT_ADDRESS", &self.vault_url);
        env.push("SECRET_STORE_VAULT_ENABLE_SSL", "false");
    }

    /// Service-discovery variables pointing the module at its own sidecar.
    pub fn okapi(&self, env: &mut EnvList, sidecar_name: &str, private_port: u16) {
        let host = self.in_mesh_host(sidecar_name);
        let url = self.in_mesh_url(sidecar_name, private_port);
        env.push("OKAPI_HOST", &host);
        env.push("OKAPI_PORT", private_port.to_string());
        env.push("OKAPI_SERVICE_HOST", &host);
        env.push("OKAPI_SERVICE_PORT", private_port.to_string());
        env.push("OKAPI_SERVICE_URL", &url);
        env.push("OKAPI_URL", &url);
    }

    pub fn disabled_system_user(&self, env: &mut EnvList) {
        env.push("SYSTEM_USER_ENABLED", "false");
        env.push("SYSTEM_USER_CREATE", "false");
    }

    /// Free-form module variables: keys upper-cased, blank keys skipped.
    pub fn module_env(&self, env: &mut EnvList, vars: &IndexMap<String, String>) {
        for (key, value) in vars {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            env.push(&key.to_uppercase(), value);
        }
    }

    pub fn sidecar_identity(&self, env: &mut EnvList, identity: &SidecarIdentity<'_>) {
        let module_url = identity
            .module_url
            .map(str::to_string)
            .unwrap_or_else(|| self.in_mesh_url(identity.module_name, identity.private_port));
        let sidecar_url = identity
            .sidecar_url
            .map(str::to_string)
            .unwrap_or_else(|| self.in_mesh_url(identity.sidecar_name, identity.private_port));

        env.push("MODULE_NAME", identity.module_name);
        env.push("MODULE_VERSION", identity.module_version.unwrap_or_default());
        env.push("MODULE_URL", module_url);
        env.push("SIDECAR_NAME", identity.sidecar_name);
        env.push("SIDECAR_URL", sidecar_url);
        if identity.private_port != self.default_private_port {
            env.push(FRAMEWORK_PORT_OVERRIDE, identity.private_port.to_string());
        }
    }

    /// Module container environment: template, debug, vault, discovery,
    /// system user, then the module's own variables.
    pub fn compose_module(
        &self,
        containers: &Containers,
        module: &RegistryModule,
        spec: &ModuleSpec,
    ) -> EnvList {
        let mut env = EnvList::new();
        self.template(&mut env, containers.global_env());
        self.debug(&mut env);
        if spec.use_vault {
            self.vault(&mut env, vault_token(containers, module.name()));
        }
        if spec.use_okapi_url {
            self.okapi(&mut env, module.sidecar_name(), spec.private_port);
        }
        if spec.disable_system_user {
            self.disabled_system_user(&mut env);
        }
        self.module_env(&mut env, &spec.env);
        env
    }

    /// Sidecar container environment: template, debug, vault, then identity.
    pub fn compose_sidecar(
        &self,
        containers: &Containers,
        spec: &ModuleSpec,
        identity: &SidecarIdentity<'_>,
    ) -> EnvList {
        let mut env = EnvList::new();
        self.template(&mut env, containers.sidecar_env());
        self.debug(&mut env);
        if spec.use_vault {
            self.vault(&mut env, vault_token(containers, identity.sidecar_name));
        }
        self.sidecar_identity(&mut env, identity);
        env
    }
}

fn vault_token<'a>(containers: &'a Containers, container: &str) -> &'a str {
    match containers.vault_root_token() {
        Some(token) => token,
        None => {
            warn!(
                component = "env",
                event = "vault_token_missing",
                container = %container,
                "vault integration requested without a root token"
            );
            ""
        }
    }
}
