//! Environment composition for module and sidecar containers.

pub mod composer;
pub mod list;


pub use composer::{EnvironmentComposer, SidecarIdentity};
pub use list::{env_value, EnvList};
