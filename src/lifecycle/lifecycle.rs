// Package lifecycle drives containers through pull, create, start, stop and remove.
//
// Every runtime call is bounded by its own timeout. A timeout is an ordinary
// error and leaves the call to finish or fail in the runtime on its own.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::naming;
use super::spec::ContainerSpec;
use crate::config::Timeouts;
use crate::runtime::{
    frames, ContainerRuntime, ContainerSummary, LogsOptions, RemoveOptions, RuntimeError,
};

/// Hard kill: containers are throwaway, nothing to flush.
pub const STOP_SIGNAL: &str = "SIGKILL";

pub struct ContainerLifecycle {
    runtime: Arc<dyn ContainerRuntime>,
    network: String,
    timeouts: Timeouts,
}

async fn bounded<T, F>(op: &'static str, limit: Duration, call: F) -> Result<T, RuntimeError>
where
    F: Future<Output = Result<T, RuntimeError>>,
{
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RuntimeError::Timeout { op, timeout: limit }),
    }
}

impl ContainerLifecycle {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, network: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            runtime,
            network: network.into(),
            timeouts,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub async fn list_by_filter(&self, filter: &str) -> Result<Vec<ContainerSummary>, RuntimeError> {
        bounded("list", self.timeouts.list, self.runtime.list_containers(filter)).await
    }

    /// Pulls `image`. Any progress event carrying an error aborts the pull.
    pub async fn pull(&self, image: &str) -> Result<(), RuntimeError> {
        let events = bounded("pull", self.timeouts.pull, self.runtime.pull_image(image)).await?;
        if let Some(reason) = events.iter().find_map(|event| event.failure()) {
            return Err(RuntimeError::PullFailed {
                image: image.to_string(),
                reason: reason.to_string(),
            });
        }
        debug!(
            component = "lifecycle",
            event = "image_pulled",
            image = %image,
            events = events.len(),
            "image pulled"
        );
        Ok(())
    }

    /// Pulls (if requested), creates and starts the container. Returns its id.
    pub async fn deploy(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        if spec.pull_image {
            self.pull(spec.image()).await?;
        }

        let created = bounded(
            "create",
            self.timeouts.deploy,
            self.runtime.create_container(
                &spec.config,
                &spec.host_config,
                &spec.network_config,
                spec.platform.as_deref(),
                &spec.name,
            ),
        )
        .await?;
        for warning in &created.warnings {
            warn!(
                component = "lifecycle",
                event = "create_warning",
                container = %spec.name,
                warning = %warning,
                "runtime reported a warning on create"
            );
        }

        bounded("start", self.timeouts.deploy, self.runtime.start_container(&created.id)).await?;

        info!(
            component = "lifecycle",
            event = "container_deployed",
            container = %spec.name,
            image = %spec.image(),
            id = %created.id,
            "container deployed"
        );
        Ok(created.id)
    }

    /// Stops and removes every container matching `pattern`. Returns how many
    /// were matched.
    ///
    /// Network disconnect and removal failures are logged and skipped. A stop
    /// failure aborts the call.
    pub async fn undeploy_by_pattern(&self, pattern: &str) -> Result<usize, RuntimeError> {
        let matched = self.list_by_filter(pattern).await?;

        for container in &matched {
            let name = container.name();

            if let Err(e) = bounded(
                "disconnect",
                self.timeouts.undeploy,
                self.runtime.disconnect_network(&self.network, &container.id, true),
            )
            .await
            {
                warn!(
                    component = "lifecycle",
                    event = "disconnect_failed",
                    container = %name,
                    network = %self.network,
                    error = %e,
                    "failed to disconnect container from network"
                );
            }

            bounded(
                "stop",
                self.timeouts.undeploy,
                self.runtime.stop_container(&container.id, STOP_SIGNAL),
            )
            .await?;

            let remove = RemoveOptions {
                force: true,
                remove_volumes: true,
            };
            match bounded(
                "remove",
                self.timeouts.undeploy,
                self.runtime.remove_container(&container.id, remove),
            )
            .await
            {
                Ok(()) => info!(
                    component = "lifecycle",
                    event = "container_undeployed",
                    container = %name,
                    "container undeployed"
                ),
                Err(e) => warn!(
                    component = "lifecycle",
                    event = "remove_failed",
                    container = %name,
                    error = %e,
                    "container stopped but not removed"
                ),
            }
        }

        Ok(matched.len())
    }

    /// Undeploys a module container and its sidecar.
    pub async fn undeploy_pair(&self, profile: &str, module_name: &str) -> Result<usize, RuntimeError> {
        self.undeploy_by_pattern(&naming::pair_pattern(profile, module_name)).await
    }

    /// Undeploys every profile-scoped container of `profile`.
    pub async fn undeploy_profile(&self, profile: &str) -> Result<usize, RuntimeError> {
        self.undeploy_by_pattern(&naming::profile_pattern(profile)).await
    }

    /// Stdout and stderr of `container`, decoded to text.
    pub async fn read_logs(&self, container: &str) -> Result<String, RuntimeError> {
        let raw = bounded(
            "logs",
            self.timeouts.logs,
            self.runtime.read_container_logs(container, LogsOptions::default()),
        )
        .await?;
        Ok(frames::decode_text(&raw)?)
    }

    /// Scans the boot log of `container` for `marker` and returns the first
    /// token following it on the same line.
    pub async fn find_secret(&self, container: &str, marker: &str) -> Result<Option<String>, RuntimeError> {
        let logs = self.read_logs(container).await?;
        Ok(scan_secret(&logs, marker))
    }
}

pub fn scan_secret(logs: &str, marker: &str) -> Option<String> {
    logs.lines().find_map(|line| {
        let (_, rest) = line.split_once(marker)?;
        rest.split_whitespace().next().map(str::to_string)
    })
}
