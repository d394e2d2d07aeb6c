//! Image namespaces and registry module listings.

pub mod namespace;
pub mod source;

#[cfg(test)]
mod registry_test;

pub use namespace::{image_reference, ConfiguredNamespace, ImageNamespace};
pub use source::{RegistrySource, StaticRegistry};
