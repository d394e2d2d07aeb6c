use std::time::Duration;

use thiserror::Error;

use super::frames::FrameError;
use crate::http::RequestError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("container runtime {op} timed out after {timeout:?}")]
    Timeout { op: &'static str, timeout: Duration },
    #[error("failed to pull image {image}: {reason}")]
    PullFailed { image: String, reason: String },
    #[error("container runtime {op} failed with status {status}: {message}")]
    Api {
        op: &'static str,
        status: u16,
        message: String,
    },
    #[error(transparent)]
    Transport(#[from] RequestError),
    #[error("failed to decode {op} response: {reason}")]
    Decode { op: &'static str, reason: String },
    #[error(transparent)]
    Frames(#[from] FrameError),
}
