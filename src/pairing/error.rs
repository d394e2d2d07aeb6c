use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::model::VersionError;
use crate::ports::PortError;
use crate::readiness::ReadinessError;
use crate::runtime::RuntimeError;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("module {module} is not part of the deployment")]
    UnknownModule { module: String },
    #[error("module {module} has no version to upgrade from")]
    MissingVersion { module: String },
    #[error("module {module} is deployed without a sidecar")]
    NoSidecar { module: String },
    #[error("no sidecar image is configured")]
    MissingImage,
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error("failed to undeploy existing pair of {module}: {source}")]
    Undeploy {
        module: String,
        #[source]
        source: RuntimeError,
    },
    #[error("failed to allocate ports for {module}: {source}")]
    Ports {
        module: String,
        #[source]
        source: PortError,
    },
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("failed to redeploy module {module}: {source}")]
    ModuleDeploy {
        module: String,
        #[source]
        source: RuntimeError,
    },
    #[error("failed to redeploy sidecar {sidecar}: {source}")]
    SidecarDeploy {
        sidecar: String,
        #[source]
        source: RuntimeError,
    },
    #[error(transparent)]
    Readiness(#[from] ReadinessError),
}
