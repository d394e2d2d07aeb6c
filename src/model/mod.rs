//! Deployment data model: resolved module specs, registry identities, batch snapshots.

pub mod containers;
pub mod pair;
pub mod registry;
pub mod result;
pub mod spec;
pub mod version;

#[cfg(test)]
mod registry_test;

// Re-export main types
pub use containers::{Containers, ContainersBuilder};
pub use pair::{ModulePair, PairPorts};
pub use registry::{is_edge, is_management, RegistryModule, EDGE_PREFIX, MANAGEMENT_PREFIX, SIDECAR_SUFFIX};
pub use result::DeploymentResult;
pub use spec::{ModuleResources, ModuleSpec};
pub use version::{next_version, VersionError};
