// Package pairing re-homes one module+sidecar pair under fresh ports.
//
// Both flows walk the same linear stages and stop at the first failure:
//
//   start -> undeploy_existing_pair -> allocate_new_ports -> notify_discovery
//         -> redeploy_module (default flow only) -> redeploy_sidecar
//         -> verify_readiness -> done
//
// The pair is a value: each stage takes it and returns the updated pair.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::PairingError;
use crate::discovery::{default_location, DiscoveryRegistrar};
use crate::lifecycle::ContainerLifecycle;
use crate::model::{next_version, ModulePair, PairPorts};
use crate::orchestrator::{ContainerBlueprints, SidecarOverrides};
use crate::ports::PortAllocator;
use crate::readiness::{ProbeTarget, ReadinessProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    UndeployExistingPair,
    AllocateNewPorts,
    NotifyDiscovery,
    RedeployModule,
    RedeploySidecar,
    VerifyReadiness,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::UndeployExistingPair => "undeploy_existing_pair",
            Stage::AllocateNewPorts => "allocate_new_ports",
            Stage::NotifyDiscovery => "notify_discovery",
            Stage::RedeployModule => "redeploy_module",
            Stage::RedeploySidecar => "redeploy_sidecar",
            Stage::VerifyReadiness => "verify_readiness",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Module and sidecar redeployed under four fresh ports.
    DefaultPair,
    /// Module runs elsewhere; only the sidecar is redeployed, pointing at it.
    CustomSidecar,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::DefaultPair => f.write_str("default_pair"),
            Flow::CustomSidecar => f.write_str("custom_sidecar"),
        }
    }
}

impl Flow {
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Flow::DefaultPair => &[
                Stage::Start,
                Stage::UndeployExistingPair,
                Stage::AllocateNewPorts,
                Stage::NotifyDiscovery,
                Stage::RedeployModule,
                Stage::RedeploySidecar,
                Stage::VerifyReadiness,
                Stage::Done,
            ],
            Flow::CustomSidecar => &[
                Stage::Start,
                Stage::UndeployExistingPair,
                Stage::AllocateNewPorts,
                Stage::NotifyDiscovery,
                Stage::RedeploySidecar,
                Stage::VerifyReadiness,
                Stage::Done,
            ],
        }
    }
}

pub struct ModulePairing {
    ports: Arc<PortAllocator>,
    lifecycle: Arc<ContainerLifecycle>,
    readiness: ReadinessProbe,
    discovery: Arc<dyn DiscoveryRegistrar>,
    blueprints: Arc<ContainerBlueprints>,
}

impl ModulePairing {
    pub fn new(
        ports: Arc<PortAllocator>,
        lifecycle: Arc<ContainerLifecycle>,
        readiness: ReadinessProbe,
        discovery: Arc<dyn DiscoveryRegistrar>,
        blueprints: Arc<ContainerBlueprints>,
    ) -> Self {
        Self {
            ports,
            lifecycle,
            readiness,
            discovery,
            blueprints,
        }
    }

    /// Routes traffic for the pair. With a module URL override the module is
    /// expected to run outside the mesh and only the sidecar is redeployed.
    pub async fn intercept(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let flow = if pair.module_url().is_some() {
            Flow::CustomSidecar
        } else {
            Flow::DefaultPair
        };
        self.run(flow, pair).await
    }

    /// Drops any interception and redeploys the pair at its in-mesh addresses.
    pub async fn restore(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let pair = pair.with_module_url(None).with_sidecar_url(None);
        self.run(Flow::DefaultPair, pair).await
    }

    /// Redeploys the pair at the next version of the module.
    pub async fn upgrade(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let current = pair.version().ok_or_else(|| PairingError::MissingVersion {
            module: pair.module_name().to_string(),
        })?;
        let next = next_version(current)?;
        info!(
            component = "pairing",
            event = "version_bumped",
            module = %pair.module_name(),
            from = %current,
            to = %next,
            "upgrading module"
        );
        let pair = pair.with_version(next);
        self.run(Flow::DefaultPair, pair).await
    }

    pub async fn run(&self, flow: Flow, mut pair: ModulePair) -> Result<ModulePair, PairingError> {
        if flow == Flow::CustomSidecar && !pair.spec().has_sidecar() {
            return Err(PairingError::NoSidecar {
                module: pair.module_name().to_string(),
            });
        }
        for stage in flow.stages() {
            log_stage(flow, *stage, &pair);
            pair = self.step(flow, *stage, pair).await?;
        }
        Ok(pair)
    }

    async fn step(&self, flow: Flow, stage: Stage, pair: ModulePair) -> Result<ModulePair, PairingError> {
        match stage {
            Stage::Start | Stage::Done => Ok(pair),
            Stage::UndeployExistingPair => self.undeploy_existing(pair).await,
            Stage::AllocateNewPorts => self.allocate_ports(flow, pair),
            Stage::NotifyDiscovery => self.notify_discovery(pair).await,
            Stage::RedeployModule => self.redeploy_module(pair).await,
            Stage::RedeploySidecar => self.redeploy_sidecar(pair).await,
            Stage::VerifyReadiness => self.verify(pair).await,
        }
    }

    async fn undeploy_existing(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let profile = pair.containers().profile().to_string();
        self.lifecycle
            .undeploy_pair(&profile, pair.module_name())
            .await
            .map_err(|source| PairingError::Undeploy {
                module: pair.module_name().to_string(),
                source,
            })?;
        Ok(pair)
    }

    fn allocate_ports(&self, flow: Flow, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let ports_err = |source| PairingError::Ports {
            module: pair.module_name().to_string(),
            source,
        };
        let current = pair.ports();
        let ports = match flow {
            Flow::DefaultPair if pair.spec().has_sidecar() => {
                let fresh = self.ports.allocate(4).map_err(ports_err)?;
                PairPorts {
                    module_server: fresh[0],
                    module_debug: fresh[1],
                    sidecar_server: fresh[2],
                    sidecar_debug: fresh[3],
                }
            }
            Flow::DefaultPair => {
                let fresh = self.ports.allocate(2).map_err(ports_err)?;
                PairPorts {
                    module_server: fresh[0],
                    module_debug: fresh[1],
                    sidecar_server: 0,
                    sidecar_debug: 0,
                }
            }
            Flow::CustomSidecar => PairPorts {
                sidecar_debug: self.ports.allocate_one().map_err(ports_err)?,
                ..current
            },
        };
        info!(
            component = "pairing",
            event = "ports_allocated",
            module = %pair.module_name(),
            module_server = ports.module_server,
            module_debug = ports.module_debug,
            sidecar_server = ports.sidecar_server,
            sidecar_debug = ports.sidecar_debug,
            "pair ports assigned"
        );
        Ok(pair.with_ports(ports))
    }

    async fn notify_discovery(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let location = match pair.sidecar_url() {
            Some(url) => url.to_string(),
            None => default_location(pair.module_name(), self.blueprints.domain(), pair.spec().private_port),
        };
        self.discovery
            .register_location(&pair.id(), pair.module_name(), pair.version(), &location)
            .await?;
        Ok(pair)
    }

    async fn redeploy_module(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let container = self.blueprints.module(pair.containers(), pair.module(), pair.spec());
        self.lifecycle
            .deploy(&container)
            .await
            .map_err(|source| PairingError::ModuleDeploy {
                module: pair.module_name().to_string(),
                source,
            })?;
        Ok(pair)
    }

    async fn redeploy_sidecar(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        if !pair.spec().has_sidecar() {
            return Ok(pair);
        }
        let image = self.blueprints.sidecar_image().ok_or(PairingError::MissingImage)?;
        let overrides = SidecarOverrides {
            module_url: pair.module_url(),
            sidecar_url: pair.sidecar_url(),
        };
        let container = self
            .blueprints
            .sidecar(pair.containers(), pair.module(), pair.spec(), &image, overrides);
        self.lifecycle
            .deploy(&container)
            .await
            .map_err(|source| PairingError::SidecarDeploy {
                sidecar: pair.module().sidecar_name().to_string(),
                source,
            })?;
        Ok(pair)
    }

    async fn verify(&self, pair: ModulePair) -> Result<ModulePair, PairingError> {
        let ports = pair.ports();
        let module = ProbeTarget::local(pair.module_name(), ports.module_server);
        if pair.spec().has_sidecar() {
            let sidecar = ProbeTarget::local(pair.module().sidecar_name(), ports.sidecar_server);
            self.readiness.check_pair(module, sidecar).await?;
        } else {
            self.readiness.check_url(&module.name, &module.url).await?;
        }
        Ok(pair)
    }
}

fn log_stage(flow: Flow, stage: Stage, pair: &ModulePair) {
    info!(
        component = "pairing",
        event = "stage",
        flow = %flow,
        stage = %stage,
        module = %pair.module_name(),
        "pairing stage"
    );
}
