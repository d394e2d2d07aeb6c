#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod discovery;
pub mod env;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod pairing;
pub mod ports;
pub mod readiness;
pub mod registry;
pub mod resolver;
pub mod runtime;
