//! Scenario tests for meshctl.
//!
//! Each case drives the real resolver, orchestrator and pairing flows against
//! the in-memory runtime, probe and registrar from `support`.

mod cases_resolution_test;

pub mod support;
