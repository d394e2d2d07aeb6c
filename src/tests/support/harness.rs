// Wires the real components around in-memory collaborators.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{FakeRuntime, FixedNamespace, RecordingRegistrar, ScriptedProbe};
use crate::config::{new_test_config, Config, ConfigTrait};
use crate::env::EnvironmentComposer;
use crate::lifecycle::ContainerLifecycle;
use crate::model::{Containers, ModulePair, ModuleSpec};
use crate::orchestrator::{ContainerBlueprints, DeploymentOrchestrator};
use crate::pairing::ModulePairing;
use crate::ports::PortAllocator;
use crate::readiness::ReadinessProbe;
use crate::registry::{RegistrySource, StaticRegistry};
use crate::resolver::ModuleSpecResolver;

pub struct Harness {
    pub cfg: Config,
    pub ports: Arc<PortAllocator>,
    pub runtime: Arc<FakeRuntime>,
    pub probe: Arc<ScriptedProbe>,
    pub registrar: Arc<RecordingRegistrar>,
    pub lifecycle: Arc<ContainerLifecycle>,
    pub blueprints: Arc<ContainerBlueprints>,
}

impl Harness {
    pub fn new(runtime: FakeRuntime) -> Self {
        Self::build(new_test_config(), runtime, ScriptedProbe::healthy(), RecordingRegistrar::new())
    }

    pub fn build(cfg: Config, runtime: FakeRuntime, probe: ScriptedProbe, registrar: RecordingRegistrar) -> Self {
        let ports = Arc::new(PortAllocator::new(cfg.port_range()));
        let runtime = Arc::new(runtime);
        let lifecycle = Arc::new(ContainerLifecycle::new(
            runtime.clone(),
            cfg.runtime().network.clone(),
            cfg.runtime().timeouts,
        ));
        let composer = EnvironmentComposer::new(cfg.mesh(), cfg.vault().url.clone());
        let blueprints = Arc::new(ContainerBlueprints::new(
            composer,
            Arc::new(FixedNamespace::new("folioorg")),
            cfg.runtime().network.clone(),
            cfg.mesh(),
            cfg.runtime().platform.clone(),
            cfg.sidecar().clone(),
        ));
        Self {
            cfg,
            ports,
            runtime,
            probe: Arc::new(probe),
            registrar: Arc::new(registrar),
            lifecycle,
            blueprints,
        }
    }

    pub fn readiness(&self) -> ReadinessProbe {
        ReadinessProbe::new(self.probe.clone(), self.cfg.readiness())
    }

    pub fn resolver(&self) -> ModuleSpecResolver {
        ModuleSpecResolver::new(self.ports.clone(), self.cfg.mesh().private_port)
    }

    pub fn orchestrator(&self) -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(
            self.resolver(),
            self.lifecycle.clone(),
            self.blueprints.clone(),
            self.readiness(),
        )
    }

    pub fn pairing(&self) -> ModulePairing {
        ModulePairing::new(
            self.ports.clone(),
            self.lifecycle.clone(),
            self.readiness(),
            self.registrar.clone(),
            self.blueprints.clone(),
        )
    }

    /// Resolves the configured modules.
    pub fn specs(&self) -> IndexMap<String, ModuleSpec> {
        self.resolver().resolve_all(self.cfg.modules()).unwrap()
    }

    /// Batch over the configured registries.
    pub fn containers(&self, specs: IndexMap<String, ModuleSpec>, management_only: bool) -> Arc<Containers> {
        let mut builder = Containers::builder(self.cfg.profile())
            .specs(specs)
            .global_env(self.cfg.module_env())
            .sidecar_env(self.cfg.sidecar_env())
            .management_only(management_only);
        for (registry, modules) in StaticRegistry::from_ids(self.cfg.registries()).modules() {
            builder = builder.registry(registry, modules);
        }
        Arc::new(builder.build())
    }

    pub fn pair(&self, containers: Arc<Containers>, module: &str) -> ModulePair {
        ModulePair::from_containers(containers, module).unwrap()
    }
}
