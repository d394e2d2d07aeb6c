//! Discovery registry collaborator and its HTTP adapter.

pub mod error;
pub mod registrar;


pub use error::DiscoveryError;
pub use registrar::{default_location, DiscoveryRegistrar, HttpDiscoveryRegistrar};
