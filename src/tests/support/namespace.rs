// Image namespace that ignores the version.

use crate::registry::ImageNamespace;

pub struct FixedNamespace(String);

impl FixedNamespace {
    pub fn new(namespace: &str) -> Self {
        Self(namespace.to_string())
    }
}

impl ImageNamespace for FixedNamespace {
    fn namespace(&self, _version: Option<&str>) -> String {
        self.0.clone()
    }
}
