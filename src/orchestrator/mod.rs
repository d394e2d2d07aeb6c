//! Batch deployment of modules and their sidecars.

pub mod blueprint;
pub mod error;
pub mod orchestrator;


pub use blueprint::{ContainerBlueprints, SidecarOverrides};
pub use error::OrchestratorError;
pub use orchestrator::DeploymentOrchestrator;
