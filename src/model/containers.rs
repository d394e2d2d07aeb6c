// Package model holds the read-only working set of one deployment batch.

use indexmap::IndexMap;

use super::{ModuleSpec, RegistryModule};

/// Snapshot of one deployment batch. Built once with [`ContainersBuilder`] and
/// shared read-only (typically behind an `Arc`) with concurrent tasks.
#[derive(Debug, Clone)]
pub struct Containers {
    profile: String,
    registry_modules: IndexMap<String, Vec<RegistryModule>>,
    specs: IndexMap<String, ModuleSpec>,
    global_env: IndexMap<String, String>,
    sidecar_env: IndexMap<String, String>,
    management_only: bool,
    vault_root_token: Option<String>,
}

impl Containers {
    pub fn builder(profile: impl Into<String>) -> ContainersBuilder {
        ContainersBuilder::new(profile)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Registry modules grouped by source registry, in registration order.
    pub fn registry_modules(&self) -> &IndexMap<String, Vec<RegistryModule>> {
        &self.registry_modules
    }

    pub fn spec(&self, module_name: &str) -> Option<&ModuleSpec> {
        self.specs.get(module_name)
    }

    pub fn specs(&self) -> &IndexMap<String, ModuleSpec> {
        &self.specs
    }

    pub fn global_env(&self) -> &IndexMap<String, String> {
        &self.global_env
    }

    pub fn sidecar_env(&self) -> &IndexMap<String, String> {
        &self.sidecar_env
    }

    pub fn management_only(&self) -> bool {
        self.management_only
    }

    pub fn vault_root_token(&self) -> Option<&str> {
        self.vault_root_token.as_deref()
    }

    /// Looks a module up by name across all registries.
    pub fn find_module(&self, module_name: &str) -> Option<&RegistryModule> {
        self.registry_modules
            .values()
            .flatten()
            .find(|module| module.name() == module_name)
    }

    /// Number of modules the batch may deploy, across registries.
    pub fn module_count(&self) -> usize {
        self.registry_modules.values().map(Vec::len).sum()
    }
}

/// Progressive builder for [`Containers`]; cloned to produce the management
/// and ordinary passes from the same inputs.
#[derive(Debug, Clone)]
pub struct ContainersBuilder {
    inner: Containers,
}

impl ContainersBuilder {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            inner: Containers {
                profile: profile.into(),
                registry_modules: IndexMap::new(),
                specs: IndexMap::new(),
                global_env: IndexMap::new(),
                sidecar_env: IndexMap::new(),
                management_only: false,
                vault_root_token: None,
            },
        }
    }

    pub fn registry(mut self, source: impl Into<String>, modules: Vec<RegistryModule>) -> Self {
        self.inner
            .registry_modules
            .entry(source.into())
            .or_default()
            .extend(modules);
        self
    }

    pub fn specs(mut self, specs: IndexMap<String, ModuleSpec>) -> Self {
        self.inner.specs = specs;
        self
    }

    pub fn spec(mut self, module_name: impl Into<String>, spec: ModuleSpec) -> Self {
        self.inner.specs.insert(module_name.into(), spec);
        self
    }

    pub fn global_env(mut self, env: IndexMap<String, String>) -> Self {
        self.inner.global_env = env;
        self
    }

    pub fn sidecar_env(mut self, env: IndexMap<String, String>) -> Self {
        self.inner.sidecar_env = env;
        self
    }

    pub fn management_only(mut self, management_only: bool) -> Self {
        self.inner.management_only = management_only;
        self
    }

    pub fn vault_root_token(mut self, token: Option<String>) -> Self {
        self.inner.vault_root_token = token;
        self
    }

    pub fn build(self) -> Containers {
        self.inner
    }
}
