//! Bounded-retry readiness checks over an HTTP probe collaborator.

pub mod error;
pub mod probe;
pub mod readiness;


pub use error::ReadinessError;
pub use probe::{HttpPinger, HttpProbe};
pub use readiness::{health_url, ProbeTarget, ReadinessProbe, DEFAULT_MAX_RETRIES, DEFAULT_WAIT, HEALTH_PATH};
