// Package runtime defines the container runtime the lifecycle drives.

use bytes::Bytes;

use super::types::{
    ContainerConfig, ContainerSummary, CreateResponse, HostConfig, LogsOptions, NetworkingConfig,
    PullEvent, RemoveOptions,
};
use super::RuntimeError;

/// ContainerRuntime is the narrow set of runtime calls the orchestrator needs.
///
/// Implementations perform a single call each and do not retry. Bounding the
/// call time is the caller's job.
#[async_trait::async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists containers (running or not) whose name matches `name_filter`.
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>, RuntimeError>;

    /// Pulls `reference` and returns every progress event the runtime emitted.
    async fn pull_image(&self, reference: &str) -> Result<Vec<PullEvent>, RuntimeError>;

    async fn create_container(
        &self,
        config: &ContainerConfig,
        host_config: &HostConfig,
        network_config: &NetworkingConfig,
        platform: Option<&str>,
        name: &str,
    ) -> Result<CreateResponse, RuntimeError>;

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError>;

    async fn stop_container(&self, id: &str, signal: &str) -> Result<(), RuntimeError>;

    async fn remove_container(&self, id: &str, opts: RemoveOptions) -> Result<(), RuntimeError>;

    async fn disconnect_network(&self, network: &str, id: &str, force: bool) -> Result<(), RuntimeError>;

    /// Raw multiplexed log stream, see [`super::frames`].
    async fn read_container_logs(&self, id: &str, opts: LogsOptions) -> Result<Bytes, RuntimeError>;
}
