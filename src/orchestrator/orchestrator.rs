// Package orchestrator deploys a whole batch of modules and their sidecars.
//
// Modules deploy one by one; the first failure aborts the batch and nothing
// already started is rolled back. Each sidecar deploys on its own task once
// its module is up. Sidecar failures are collected after every task finished.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::blueprint::{ContainerBlueprints, SidecarOverrides};
use super::OrchestratorError;
use crate::lifecycle::{naming, ContainerLifecycle};
use crate::model::{Containers, DeploymentResult, ModuleSpec, RegistryModule};
use crate::readiness::{ProbeTarget, ReadinessProbe};
use crate::resolver::ModuleSpecResolver;

pub struct DeploymentOrchestrator {
    resolver: ModuleSpecResolver,
    lifecycle: Arc<ContainerLifecycle>,
    blueprints: Arc<ContainerBlueprints>,
    readiness: ReadinessProbe,
}

impl DeploymentOrchestrator {
    pub fn new(
        resolver: ModuleSpecResolver,
        lifecycle: Arc<ContainerLifecycle>,
        blueprints: Arc<ContainerBlueprints>,
        readiness: ReadinessProbe,
    ) -> Self {
        Self {
            resolver,
            lifecycle,
            blueprints,
            readiness,
        }
    }

    /// Resolves the configured modules into specs, allocating their ports.
    pub fn resolve(
        &self,
        modules: &IndexMap<String, Option<Value>>,
    ) -> Result<IndexMap<String, ModuleSpec>, OrchestratorError> {
        Ok(self.resolver.resolve_all(modules)?)
    }

    /// Deploys every module of the batch that matches its management flag and
    /// has a spec with `deploy_module` set, then the sidecars they call for.
    pub async fn deploy(&self, containers: Arc<Containers>) -> Result<DeploymentResult, OrchestratorError> {
        let mut result = DeploymentResult::new();
        let sidecar_image = self.blueprints.sidecar_image();

        // One slot per module: no sidecar task ever waits to report.
        let (tx, mut rx) = mpsc::channel::<OrchestratorError>(containers.module_count().max(1));
        let mut sidecars = JoinSet::new();
        let mut failure = None;

        'batch: for (registry, modules) in containers.registry_modules() {
            for module in modules {
                let Some(spec) = self.deployable(&containers, module) else {
                    continue;
                };

                let container = self.blueprints.module(&containers, module, spec);
                if let Err(source) = self.lifecycle.deploy(&container).await {
                    error!(
                        component = "orchestrator",
                        event = "module_deploy_failed",
                        registry = %registry,
                        module = %module.name(),
                        error = %source,
                        "module deploy failed, aborting batch"
                    );
                    failure = Some(OrchestratorError::ModuleDeploy {
                        module: module.name().to_string(),
                        source,
                    });
                    break 'batch;
                }
                result.record(module.name(), spec.module_server_port);

                if !spec.has_sidecar() {
                    continue;
                }
                let Some(image) = sidecar_image.as_deref() else {
                    warn!(
                        component = "orchestrator",
                        event = "sidecar_image_missing",
                        module = %module.name(),
                        "no sidecar image configured, skipping sidecar"
                    );
                    continue;
                };

                let sidecar = self
                    .blueprints
                    .sidecar(&containers, module, spec, image, SidecarOverrides::default());
                let lifecycle = self.lifecycle.clone();
                let tx = tx.clone();
                let module_name = module.name().to_string();
                let sidecar_name = module.sidecar_name().to_string();
                sidecars.spawn(async move {
                    if let Err(source) = lifecycle.deploy(&sidecar).await {
                        error!(
                            component = "orchestrator",
                            event = "sidecar_deploy_failed",
                            module = %module_name,
                            sidecar = %sidecar_name,
                            error = %source,
                            "sidecar deploy failed"
                        );
                        let err = OrchestratorError::SidecarDeploy {
                            module: module_name,
                            sidecar: sidecar_name,
                            source,
                        };
                        if let Err(dropped) = tx.try_send(err) {
                            warn!(
                                component = "orchestrator",
                                event = "sidecar_error_dropped",
                                error = %dropped,
                                "sidecar failure could not be reported"
                            );
                        }
                    }
                });
            }
        }
        drop(tx);

        // Sidecar tasks already running when the batch failed still finish.
        while let Some(joined) = sidecars.join_next().await {
            if let Err(e) = joined {
                warn!(
                    component = "orchestrator",
                    event = "sidecar_task_failed",
                    error = %e,
                    "sidecar task did not complete"
                );
            }
        }
        let sidecar_failure = rx.try_recv().ok();

        if let Some(err) = failure {
            return Err(err);
        }
        if let Some(err) = sidecar_failure {
            return Err(err);
        }

        info!(
            component = "orchestrator",
            event = "batch_deployed",
            profile = %containers.profile(),
            management_only = containers.management_only(),
            modules = result.len(),
            "deployment batch completed"
        );
        Ok(result)
    }

    /// Checks every deployed module of the batch, and its sidecar, concurrently.
    /// Returns the first failure once all checks finished.
    pub async fn await_readiness(&self, containers: &Containers) -> Result<(), OrchestratorError> {
        let mut checks = JoinSet::new();

        for module in containers.registry_modules().values().flatten() {
            let Some(spec) = self.deployable(containers, module) else {
                continue;
            };
            let probe = self.readiness.clone();
            let module_target = ProbeTarget::local(module.name(), spec.module_server_port);
            if spec.has_sidecar() && self.blueprints.sidecar_image().is_some() {
                let sidecar_target = ProbeTarget::local(module.sidecar_name(), spec.sidecar_server_port);
                checks.spawn(async move { probe.check_pair(module_target, sidecar_target).await });
            } else {
                checks.spawn(async move { probe.check_url(&module_target.name, &module_target.url).await });
            }
        }

        let mut first = None;
        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first.get_or_insert(OrchestratorError::Readiness(e));
                }
                Err(e) => warn!(
                    component = "orchestrator",
                    event = "readiness_task_failed",
                    error = %e,
                    "readiness task did not complete"
                ),
            }
        }
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Undeploys every container of `profile`. Management containers are left
    /// alone unless `include_management` is set.
    pub async fn undeploy_profile(&self, profile: &str, include_management: bool) -> Result<usize, OrchestratorError> {
        let mut removed = self.lifecycle.undeploy_profile(profile).await?;
        if include_management {
            removed += self
                .lifecycle
                .undeploy_by_pattern(&naming::management_pattern())
                .await?;
        }
        info!(
            component = "orchestrator",
            event = "profile_undeployed",
            profile = %profile,
            removed,
            "profile undeployed"
        );
        Ok(removed)
    }

    /// Spec of `module` if this batch deploys it.
    fn deployable<'a>(&self, containers: &'a Containers, module: &RegistryModule) -> Option<&'a ModuleSpec> {
        if module.is_management() != containers.management_only() {
            return None;
        }
        match containers.spec(module.name()) {
            Some(spec) if spec.deploy_module => Some(spec),
            Some(_) => {
                debug!(
                    component = "orchestrator",
                    event = "module_disabled",
                    module = %module.name(),
                    "module not deployed by configuration"
                );
                None
            }
            None => {
                debug!(
                    component = "orchestrator",
                    event = "module_unconfigured",
                    module = %module.name(),
                    "no spec for registry module"
                );
                None
            }
        }
    }
}
