//! Host port bookkeeping for module and sidecar containers.

pub mod allocator;
pub mod error;


pub use allocator::{PortAllocator, PortRange};
pub use error::PortError;
