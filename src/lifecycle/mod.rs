//! Container lifecycle over the runtime collaborator: deploy, undeploy by
//! pattern, log reads, plus container naming and create payloads.

pub mod lifecycle;
pub mod naming;
pub mod spec;


pub use lifecycle::{scan_secret, ContainerLifecycle, STOP_SIGNAL};
pub use spec::{aliases, network_config, ContainerSpec, ContainerSpecBuilder};
