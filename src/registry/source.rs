// Package registry: module listings per source registry.

use indexmap::IndexMap;

use crate::model::RegistryModule;

/// Supplies the modules each registry lists, keyed by registry name.
pub trait RegistrySource: Send + Sync {
    fn modules(&self) -> IndexMap<String, Vec<RegistryModule>>;
}

/// Registry listings fixed at startup, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    modules: IndexMap<String, Vec<RegistryModule>>,
}

impl StaticRegistry {
    /// Parses module ids like `mod-users-19.3.0` per registry. Duplicate ids
    /// within one registry are kept once.
    pub fn from_ids(registries: &IndexMap<String, Vec<String>>) -> Self {
        let modules = registries
            .iter()
            .map(|(registry, ids)| {
                let mut parsed: Vec<RegistryModule> = Vec::with_capacity(ids.len());
                for id in ids.iter().filter(|id| !id.trim().is_empty()) {
                    let module = RegistryModule::from_id(id);
                    if !parsed.contains(&module) {
                        parsed.push(module);
                    }
                }
                (registry.clone(), parsed)
            })
            .collect();
        Self { modules }
    }
}

impl RegistrySource for StaticRegistry {
    fn modules(&self) -> IndexMap<String, Vec<RegistryModule>> {
        self.modules.clone()
    }
}
