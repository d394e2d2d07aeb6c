//! Turns raw per-module configuration into port-assigned [`ModuleSpec`]s.
//!
//! [`ModuleSpec`]: crate::model::ModuleSpec

pub mod error;
pub mod resolver;
pub mod typed;
pub mod volumes;


pub use error::ResolveError;
pub use resolver::ModuleSpecResolver;
