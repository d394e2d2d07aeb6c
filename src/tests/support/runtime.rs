// In-memory container runtime for tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use regex::Regex;

use crate::runtime::{
    ContainerConfig, ContainerRuntime, ContainerSummary, CreateResponse, HostConfig, LogsOptions,
    NetworkingConfig, PullEvent, RemoveOptions, RuntimeError,
};

/// One recorded runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Pull(String),
    Create { name: String, image: String },
    Start(String),
    Stop { id: String, signal: String },
    Remove { id: String, force: bool, volumes: bool },
    Disconnect { network: String, id: String },
    Logs(String),
}

impl Call {
    pub fn op(&self) -> &'static str {
        match self {
            Call::List(_) => "list",
            Call::Pull(_) => "pull",
            Call::Create { .. } => "create",
            Call::Start(_) => "start",
            Call::Stop { .. } => "stop",
            Call::Remove { .. } => "remove",
            Call::Disconnect { .. } => "disconnect",
            Call::Logs(_) => "logs",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatedContainer {
    pub name: String,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
    pub network_config: NetworkingConfig,
    pub platform: Option<String>,
}

#[derive(Default)]
struct State {
    containers: Vec<ContainerSummary>,
    created: Vec<CreatedContainer>,
    calls: Vec<Call>,
    failures: HashSet<(String, String)>,
    pull_events: HashMap<String, Vec<PullEvent>>,
    create_warnings: Vec<String>,
    logs: HashMap<String, Bytes>,
    delays: HashMap<String, Duration>,
}

/// Records every call, keeps a container table keyed by name and fails the
/// calls registered with [`FakeRuntime::fail_on`].
///
/// Created containers use their name as id.
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a running container.
    pub fn with_container(self, name: &str, image: &str) -> Self {
        self.state.lock().containers.push(summary(name, image, "running"));
        self
    }

    /// Fails `op` ("pull", "create", "start", "stop", "remove", "disconnect",
    /// "list", "logs") for `target` (container name/id or image, `*` for any).
    pub fn fail_on(self, op: &str, target: &str) -> Self {
        self.state.lock().failures.insert((op.to_string(), target.to_string()));
        self
    }

    pub fn with_pull_events(self, image: &str, events: Vec<PullEvent>) -> Self {
        self.state.lock().pull_events.insert(image.to_string(), events);
        self
    }

    pub fn with_create_warnings(self, warnings: Vec<String>) -> Self {
        self.state.lock().create_warnings = warnings;
        self
    }

    pub fn with_logs(self, container: &str, raw: Vec<u8>) -> Self {
        self.state.lock().logs.insert(container.to_string(), Bytes::from(raw));
        self
    }

    /// Delays every `op` call by `delay` before it completes.
    pub fn with_delay(self, op: &str, delay: Duration) -> Self {
        self.state.lock().delays.insert(op.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn created(&self) -> Vec<CreatedContainer> {
        self.state.lock().created.clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.state.lock().created.iter().map(|c| c.name.clone()).collect()
    }

    pub fn find_created(&self, name: &str) -> Option<CreatedContainer> {
        self.state.lock().created.iter().rev().find(|c| c.name == name).cloned()
    }

    /// Names of containers currently in the table.
    pub fn container_names(&self) -> Vec<String> {
        self.state.lock().containers.iter().map(|c| c.name().to_string()).collect()
    }

    async fn enter(&self, call: Call, target: &str) -> Result<(), RuntimeError> {
        let op = call.op();
        let (delay, failing) = {
            let mut state = self.state.lock();
            state.calls.push(call);
            let failing = state.failures.contains(&(op.to_string(), target.to_string()))
                || state.failures.contains(&(op.to_string(), "*".to_string()));
            (state.delays.get(op).copied(), failing)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(RuntimeError::Api {
                op,
                status: 500,
                message: format!("scripted {} failure for {}", op, target),
            });
        }
        Ok(())
    }
}

fn summary(name: &str, image: &str, state: &str) -> ContainerSummary {
    ContainerSummary {
        id: name.to_string(),
        names: vec![format!("/{}", name)],
        image: image.to_string(),
        state: state.to_string(),
        status: String::new(),
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.enter(Call::List(name_filter.to_string()), name_filter).await?;
        let pattern = Regex::new(name_filter).map_err(|e| RuntimeError::Api {
            op: "list",
            status: 400,
            message: e.to_string(),
        })?;
        Ok(self
            .state
            .lock()
            .containers
            .iter()
            .filter(|c| c.names.iter().any(|n| pattern.is_match(n)))
            .cloned()
            .collect())
    }

    async fn pull_image(&self, reference: &str) -> Result<Vec<PullEvent>, RuntimeError> {
        self.enter(Call::Pull(reference.to_string()), reference).await?;
        let scripted = self.state.lock().pull_events.get(reference).cloned();
        Ok(scripted.unwrap_or_else(|| {
            vec![PullEvent {
                status: Some(format!("Status: Image is up to date for {}", reference)),
                ..PullEvent::default()
            }]
        }))
    }

    async fn create_container(
        &self,
        config: &ContainerConfig,
        host_config: &HostConfig,
        network_config: &NetworkingConfig,
        platform: Option<&str>,
        name: &str,
    ) -> Result<CreateResponse, RuntimeError> {
        self.enter(
            Call::Create {
                name: name.to_string(),
                image: config.image.clone(),
            },
            name,
        )
        .await?;
        let mut state = self.state.lock();
        state.created.push(CreatedContainer {
            name: name.to_string(),
            config: config.clone(),
            host_config: host_config.clone(),
            network_config: network_config.clone(),
            platform: platform.map(str::to_string),
        });
        state.containers.push(summary(name, &config.image, "created"));
        Ok(CreateResponse {
            id: name.to_string(),
            warnings: state.create_warnings.clone(),
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        self.enter(Call::Start(id.to_string()), id).await?;
        if let Some(c) = self.state.lock().containers.iter_mut().find(|c| c.id == id) {
            c.state = "running".to_string();
        }
        Ok(())
    }

    async fn stop_container(&self, id: &str, signal: &str) -> Result<(), RuntimeError> {
        self.enter(
            Call::Stop {
                id: id.to_string(),
                signal: signal.to_string(),
            },
            id,
        )
        .await?;
        if let Some(c) = self.state.lock().containers.iter_mut().find(|c| c.id == id) {
            c.state = "exited".to_string();
        }
        Ok(())
    }

    async fn remove_container(&self, id: &str, opts: RemoveOptions) -> Result<(), RuntimeError> {
        self.enter(
            Call::Remove {
                id: id.to_string(),
                force: opts.force,
                volumes: opts.remove_volumes,
            },
            id,
        )
        .await?;
        self.state.lock().containers.retain(|c| c.id != id);
        Ok(())
    }

    async fn disconnect_network(&self, network: &str, id: &str, _force: bool) -> Result<(), RuntimeError> {
        self.enter(
            Call::Disconnect {
                network: network.to_string(),
                id: id.to_string(),
            },
            id,
        )
        .await
    }

    async fn read_container_logs(&self, id: &str, _opts: LogsOptions) -> Result<Bytes, RuntimeError> {
        self.enter(Call::Logs(id.to_string()), id).await?;
        Ok(self.state.lock().logs.get(id).cloned().unwrap_or_default())
    }
}
