use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    #[error("module {name} is not ready after {attempts} health checks")]
    ModuleNotReady { name: String, attempts: u32 },
    #[error("readiness check for {name} aborted: {reason}")]
    Aborted { name: String, reason: String },
}
