// Error definitions for the port pool.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port pool exhausted: requested {requested}, available {available}")]
    Exhausted { requested: usize, available: usize },
    #[error("invalid port range {start}..={end}")]
    InvalidRange { start: u16, end: u16 },
}
