//! Application wiring and the commands exposed by the CLI.

pub mod app;


pub use app::{App, Collaborators, VAULT_TOKEN_MARKER};
