// Recording discovery registrar.

use parking_lot::Mutex;

use crate::discovery::{DiscoveryError, DiscoveryRegistrar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub module_id: String,
    pub name: String,
    pub version: Option<String>,
    pub location: String,
}

#[derive(Default)]
pub struct RecordingRegistrar {
    registrations: Mutex<Vec<Registration>>,
    fail: bool,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every registration.
    pub fn failing() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations.lock().clone()
    }
}

#[async_trait::async_trait]
impl DiscoveryRegistrar for RecordingRegistrar {
    async fn register_location(
        &self,
        module_id: &str,
        name: &str,
        version: Option<&str>,
        location: &str,
    ) -> Result<(), DiscoveryError> {
        self.registrations.lock().push(Registration {
            module_id: module_id.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
            location: location.to_string(),
        });
        if self.fail {
            return Err(DiscoveryError::Rejected {
                module_id: module_id.to_string(),
                status: 503,
                message: "discovery unavailable".to_string(),
            });
        }
        Ok(())
    }
}
