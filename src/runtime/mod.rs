//! Container runtime collaborator: the trait the lifecycle drives, the Docker
//! Engine adapter and the log frame decoder.

pub mod docker;
pub mod error;
pub mod frames;
pub mod runtime;
pub mod types;


pub use docker::DockerEngine;
pub use error::RuntimeError;
pub use runtime::ContainerRuntime;
pub use types::{
    ContainerConfig, ContainerSummary, CreateResponse, EmptyObject, EndpointSettings, HostConfig,
    LogsOptions, NetworkingConfig, PortBinding, PullEvent, RemoveOptions, RestartPolicy,
};
