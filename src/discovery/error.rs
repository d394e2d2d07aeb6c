use thiserror::Error;

use crate::http::RequestError;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery registry url is not configured")]
    NotConfigured,
    #[error("discovery registry rejected {module_id} with status {status}: {message}")]
    Rejected {
        module_id: String,
        status: u16,
        message: String,
    },
    #[error(transparent)]
    Transport(#[from] RequestError),
    #[error("failed to encode discovery payload: {0}")]
    Encode(#[from] serde_json::Error),
}
