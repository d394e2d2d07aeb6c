//! Interception and upgrade flows for a single module+sidecar pair.

pub mod error;
pub mod pairing;

#[cfg(test)]
mod pairing_test;

pub use error::PairingError;
pub use pairing::{Flow, ModulePairing, Stage};
