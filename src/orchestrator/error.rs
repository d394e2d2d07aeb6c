use thiserror::Error;

use crate::readiness::ReadinessError;
use crate::resolver::ResolveError;
use crate::runtime::RuntimeError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("failed to deploy module {module}: {source}")]
    ModuleDeploy {
        module: String,
        #[source]
        source: RuntimeError,
    },
    #[error("failed to deploy sidecar {sidecar} of module {module}: {source}")]
    SidecarDeploy {
        module: String,
        sidecar: String,
        #[source]
        source: RuntimeError,
    },
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Readiness(#[from] ReadinessError),
}
