use std::path::PathBuf;

use crate::ports::PortError;

/// Resolution failures. Any of them aborts the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("local descriptor of module {module} not found: {path:?}")]
    LocalDescriptorNotFound { module: String, path: PathBuf },
    #[error("local descriptor {path:?} of module {module} is not a JSON object: {reason}")]
    InvalidLocalDescriptor {
        module: String,
        path: PathBuf,
        reason: String,
    },
    #[error("volume {volume:?} of module {module} does not exist on the host")]
    VolumeNotFound { module: String, volume: String },
    #[error("port {port} of module {module} is already taken in this batch")]
    PortConflict { module: String, port: u16 },
    #[error("allocate ports for module {module}: {source}")]
    Port {
        module: String,
        #[source]
        source: PortError,
    },
}
