// Package lifecycle: the create payload for one container.

use crate::env::EnvList;
use crate::model::ModuleResources;
use crate::runtime::{
    ContainerConfig, EmptyObject, EndpointSettings, HostConfig, NetworkingConfig, PortBinding,
    RestartPolicy,
};

const MIB: i64 = 1024 * 1024;
const NANO_CPUS: i64 = 1_000_000_000;
pub const DEFAULT_RESTART_POLICY: &str = "unless-stopped";
const ALL_INTERFACES: &str = "0.0.0.0";

/// Everything the runtime needs to create and start one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
    pub network_config: NetworkingConfig,
    pub platform: Option<String>,
    /// Pull the image before creating the container.
    pub pull_image: bool,
}

impl ContainerSpec {
    pub fn builder(name: impl Into<String>, image: impl Into<String>) -> ContainerSpecBuilder {
        ContainerSpecBuilder::new(name.into(), image.into())
    }

    pub fn image(&self) -> &str {
        &self.config.image
    }
}

/// Shared network attachment with the DNS aliases of a container.
///
/// Built once per container kind and reused for every container of a batch.
pub fn network_config(network: &str, aliases: Vec<String>) -> NetworkingConfig {
    let mut config = NetworkingConfig::default();
    config
        .endpoints_config
        .insert(network.to_string(), EndpointSettings { aliases });
    config
}

/// `<name>` and `<name>.<domain>`.
pub fn aliases(name: &str, domain: &str) -> Vec<String> {
    vec![name.to_string(), format!("{}.{}", name, domain)]
}

pub struct ContainerSpecBuilder {
    spec: ContainerSpec,
}

impl ContainerSpecBuilder {
    fn new(name: String, image: String) -> Self {
        let mut host_config = HostConfig::default();
        host_config.restart_policy = RestartPolicy {
            name: DEFAULT_RESTART_POLICY.to_string(),
        };
        apply_resources(&mut host_config, &ModuleResources::default());
        Self {
            spec: ContainerSpec {
                name,
                config: ContainerConfig {
                    image,
                    ..ContainerConfig::default()
                },
                host_config,
                network_config: NetworkingConfig::default(),
                platform: None,
                pull_image: true,
            },
        }
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.spec.config.hostname = Some(hostname.into());
        self
    }

    pub fn env(mut self, env: EnvList) -> Self {
        self.spec.config.env = env.into_vec();
        self
    }

    /// Exposes `container_port` and binds it to `host_port`. A zero host port
    /// exposes the port inside the network only.
    pub fn port(mut self, container_port: u16, host_port: u16) -> Self {
        let key = format!("{}/tcp", container_port);
        self.spec.config.exposed_ports.insert(key.clone(), EmptyObject {});
        if host_port != 0 {
            self.spec.host_config.port_bindings.insert(
                key,
                vec![PortBinding {
                    host_ip: ALL_INTERFACES.to_string(),
                    host_port: host_port.to_string(),
                }],
            );
        }
        self
    }

    pub fn binds(mut self, binds: &[String]) -> Self {
        self.spec.host_config.binds = binds.to_vec();
        self
    }

    pub fn resources(mut self, resources: &ModuleResources) -> Self {
        apply_resources(&mut self.spec.host_config, resources);
        self
    }

    pub fn restart_policy(mut self, name: impl Into<String>) -> Self {
        self.spec.host_config.restart_policy = RestartPolicy { name: name.into() };
        self
    }

    pub fn network(mut self, network_config: NetworkingConfig) -> Self {
        self.spec.network_config = network_config;
        self
    }

    pub fn platform(mut self, platform: Option<String>) -> Self {
        self.spec.platform = platform.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn pull_image(mut self, pull: bool) -> Self {
        self.spec.pull_image = pull;
        self
    }

    pub fn build(self) -> ContainerSpec {
        self.spec
    }
}

fn apply_resources(host: &mut HostConfig, resources: &ModuleResources) {
    host.nano_cpus = resources.cpu_count.max(0) * NANO_CPUS;
    host.memory = resources.memory * MIB;
    host.memory_reservation = resources.memory_reservation * MIB;
    host.memory_swap = if resources.memory_swap < 0 {
        -1
    } else {
        resources.memory_swap * MIB
    };
    host.oom_kill_disable = resources.oom_kill_disable;
}
