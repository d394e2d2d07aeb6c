// Shared fakes and wiring for unit and scenario tests.

pub mod discovery;
pub mod harness;
pub mod namespace;
pub mod probe;
pub mod runtime;

pub use discovery::{RecordingRegistrar, Registration};
pub use harness::Harness;
pub use namespace::FixedNamespace;
pub use probe::ScriptedProbe;
pub use runtime::{Call, CreatedContainer, FakeRuntime};
