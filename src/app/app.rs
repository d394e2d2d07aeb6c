// Main orchestrator application: wires collaborators and runs one command.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, ConfigTrait};
use crate::discovery::{DiscoveryRegistrar, HttpDiscoveryRegistrar};
use crate::env::EnvironmentComposer;
use crate::http::create_client;
use crate::lifecycle::ContainerLifecycle;
use crate::model::{Containers, DeploymentResult, ModulePair, ModuleSpec};
use crate::orchestrator::{ContainerBlueprints, DeploymentOrchestrator};
use crate::pairing::{ModulePairing, PairingError};
use crate::ports::PortAllocator;
use crate::readiness::{HttpPinger, HttpProbe, ReadinessProbe};
use crate::registry::{ConfiguredNamespace, ImageNamespace, RegistrySource, StaticRegistry};
use crate::resolver::ModuleSpecResolver;
use crate::runtime::{ContainerRuntime, DockerEngine};

/// Marker preceding the root token in the vault container's boot log.
pub const VAULT_TOKEN_MARKER: &str = "Root Token: ";

/// External systems the application talks to.
pub struct Collaborators {
    pub runtime: Arc<dyn ContainerRuntime>,
    pub probe: Arc<dyn HttpProbe>,
    pub discovery: Arc<dyn DiscoveryRegistrar>,
    pub namespace: Arc<dyn ImageNamespace>,
    pub registry: Arc<dyn RegistrySource>,
}

impl Collaborators {
    /// Docker engine, HTTP health probe and discovery over one shared client.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = create_client().context("failed to build http client")?;
        let timeouts = cfg.runtime().timeouts;
        let longest = [
            timeouts.list,
            timeouts.pull,
            timeouts.deploy,
            timeouts.undeploy,
            timeouts.logs,
        ]
        .into_iter()
        .max()
        .unwrap_or(timeouts.pull);

        Ok(Self {
            runtime: Arc::new(DockerEngine::new(client.clone(), cfg.runtime(), longest)),
            probe: Arc::new(HttpPinger::new(client.clone(), cfg.readiness().timeout)),
            discovery: Arc::new(HttpDiscoveryRegistrar::new(client, cfg.discovery())),
            namespace: Arc::new(ConfiguredNamespace::new(cfg.namespaces())),
            registry: Arc::new(StaticRegistry::from_ids(cfg.registries())),
        })
    }
}

pub struct App {
    cfg: Config,
    collaborators: Collaborators,
    lifecycle: Arc<ContainerLifecycle>,
    blueprints: Arc<ContainerBlueprints>,
}

impl App {
    pub fn new(cfg: Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(&cfg)?;
        Ok(Self::with_collaborators(cfg, collaborators))
    }

    pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
        let lifecycle = Arc::new(ContainerLifecycle::new(
            collaborators.runtime.clone(),
            cfg.runtime().network.clone(),
            cfg.runtime().timeouts,
        ));
        let blueprints = Arc::new(ContainerBlueprints::new(
            EnvironmentComposer::new(cfg.mesh(), cfg.vault().url.clone()),
            collaborators.namespace.clone(),
            cfg.runtime().network.clone(),
            cfg.mesh(),
            cfg.runtime().platform.clone(),
            cfg.sidecar().clone(),
        ));
        Self {
            cfg,
            collaborators,
            lifecycle,
            blueprints,
        }
    }

    fn allocator(&self) -> Arc<PortAllocator> {
        let range = self.cfg.port_range();
        if self.cfg.ports().check_host {
            Arc::new(PortAllocator::with_host_check(range))
        } else {
            Arc::new(PortAllocator::new(range))
        }
    }

    fn readiness(&self) -> ReadinessProbe {
        ReadinessProbe::new(self.collaborators.probe.clone(), self.cfg.readiness())
    }

    fn orchestrator(&self, ports: Arc<PortAllocator>) -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(
            ModuleSpecResolver::new(ports, self.cfg.mesh().private_port),
            self.lifecycle.clone(),
            self.blueprints.clone(),
            self.readiness(),
        )
    }

    /// Resolves every configured module, deploys management modules first and
    /// the rest of the profile second, then waits for readiness.
    pub async fn deploy(&self, skip_readiness: bool) -> Result<DeploymentResult> {
        let orchestrator = self.orchestrator(self.allocator());
        let specs = orchestrator
            .resolve(self.cfg.modules())
            .context("failed to resolve module configuration")?;
        let token = self.vault_token(&specs).await?;

        let mut result = DeploymentResult::new();
        for management_only in [true, false] {
            let containers = self.containers(specs.clone(), management_only, token.clone());
            let pass = orchestrator
                .deploy(containers.clone())
                .await
                .with_context(|| deploy_context(management_only))?;
            if !skip_readiness {
                orchestrator
                    .await_readiness(&containers)
                    .await
                    .with_context(|| format!("{} did not become ready", pass_name(management_only)))?;
            }
            result.extend(pass);
        }

        for (module, port) in result.iter() {
            info!(
                component = "app",
                event = "module_deployed",
                profile = %self.cfg.profile(),
                module = %module,
                port,
                "module available"
            );
        }
        Ok(result)
    }

    /// Removes every container of the configured profile, and the management
    /// modules when `include_management` is set.
    pub async fn undeploy(&self, include_management: bool) -> Result<usize> {
        self.orchestrator(self.allocator())
            .undeploy_profile(self.cfg.profile(), include_management)
            .await
            .with_context(|| format!("failed to undeploy profile {}", self.cfg.profile()))
    }

    pub async fn intercept(
        &self,
        module: &str,
        module_url: Option<String>,
        sidecar_url: Option<String>,
    ) -> Result<ModulePair> {
        let (pairing, pair) = self.pairing_for(module).await?;
        let pair = pair.with_module_url(module_url).with_sidecar_url(sidecar_url);
        pairing
            .intercept(pair)
            .await
            .with_context(|| format!("failed to intercept {}", module))
    }

    pub async fn restore(&self, module: &str) -> Result<ModulePair> {
        let (pairing, pair) = self.pairing_for(module).await?;
        pairing
            .restore(pair)
            .await
            .with_context(|| format!("failed to restore {}", module))
    }

    pub async fn upgrade(&self, module: &str) -> Result<ModulePair> {
        let (pairing, pair) = self.pairing_for(module).await?;
        pairing
            .upgrade(pair)
            .await
            .with_context(|| format!("failed to upgrade {}", module))
    }

    /// Rebuilds the current pair of `module` from configuration.
    ///
    /// The current ports are replayed on an allocator without host checks so
    /// they match the ones handed out at deploy time. Fresh ports come from the
    /// configured allocator with the replayed ports already taken.
    async fn pairing_for(&self, module: &str) -> Result<(ModulePairing, ModulePair)> {
        let replay = Arc::new(PortAllocator::new(self.cfg.port_range()));
        let specs = ModuleSpecResolver::new(replay.clone(), self.cfg.mesh().private_port)
            .resolve_all(self.cfg.modules())
            .context("failed to resolve module configuration")?;

        let fresh = self.allocator();
        for port in replay.issued() {
            fresh.reserve(port);
        }

        let token = self.vault_token(&specs).await?;
        let containers = self.containers(specs, false, token);
        let pair = ModulePair::from_containers(containers, module).ok_or_else(|| PairingError::UnknownModule {
            module: module.to_string(),
        })?;

        let pairing = ModulePairing::new(
            fresh,
            self.lifecycle.clone(),
            self.readiness(),
            self.collaborators.discovery.clone(),
            self.blueprints.clone(),
        );
        Ok((pairing, pair))
    }

    fn containers(
        &self,
        specs: IndexMap<String, ModuleSpec>,
        management_only: bool,
        vault_token: Option<String>,
    ) -> Arc<Containers> {
        let mut builder = Containers::builder(self.cfg.profile())
            .specs(specs)
            .global_env(self.cfg.module_env())
            .sidecar_env(self.cfg.sidecar_env())
            .management_only(management_only)
            .vault_root_token(vault_token);
        for (registry, modules) in self.collaborators.registry.modules() {
            builder = builder.registry(registry, modules);
        }
        Arc::new(builder.build())
    }

    /// Reads the root token from the vault container when any module uses vault.
    async fn vault_token(&self, specs: &IndexMap<String, ModuleSpec>) -> Result<Option<String>> {
        if !specs.values().any(|s| s.deploy_module && s.use_vault) {
            return Ok(None);
        }
        let Some(container) = self.cfg.vault().container.as_deref() else {
            warn!(
                component = "app",
                event = "vault_container_unset",
                "modules use vault but no vault container is configured"
            );
            return Ok(None);
        };

        let token = self
            .lifecycle
            .find_secret(container, VAULT_TOKEN_MARKER)
            .await
            .with_context(|| format!("failed to read logs of vault container {}", container))?;
        if token.is_none() {
            warn!(
                component = "app",
                event = "vault_token_not_found",
                container = %container,
                "vault root token not found in container logs"
            );
        }
        Ok(token)
    }
}

fn pass_name(management_only: bool) -> &'static str {
    if management_only {
        "management modules"
    } else {
        "profile modules"
    }
}

fn deploy_context(management_only: bool) -> String {
    format!("failed to deploy {}", pass_name(management_only))
}
