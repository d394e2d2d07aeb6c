// Package registry chooses where module images are pulled from.

use crate::config::Namespaces;

pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";
pub const LATEST_TAG: &str = "latest";

/// Chooses the image namespace for a module version.
pub trait ImageNamespace: Send + Sync {
    fn namespace(&self, version: Option<&str>) -> String;
}

/// Override when set, otherwise the snapshot namespace for snapshot versions
/// and the release namespace for everything else.
#[derive(Debug, Clone)]
pub struct ConfiguredNamespace {
    release: String,
    snapshot: String,
    override_namespace: Option<String>,
}

impl ConfiguredNamespace {
    pub fn new(cfg: &Namespaces) -> Self {
        Self {
            release: cfg.release.clone(),
            snapshot: cfg.snapshot.clone(),
            override_namespace: cfg
                .override_namespace
                .clone()
                .filter(|ns| !ns.trim().is_empty()),
        }
    }
}

impl ImageNamespace for ConfiguredNamespace {
    fn namespace(&self, version: Option<&str>) -> String {
        if let Some(ns) = &self.override_namespace {
            return ns.clone();
        }
        match version {
            Some(v) if v.to_ascii_uppercase().contains(SNAPSHOT_MARKER) => self.snapshot.clone(),
            _ => self.release.clone(),
        }
    }
}

/// `<namespace>/<name>:<version>`, tagged `latest` without a version. An empty
/// namespace yields a bare `<name>:<version>`.
pub fn image_reference(namespace: &str, name: &str, version: Option<&str>) -> String {
    let tag = version.filter(|v| !v.is_empty()).unwrap_or(LATEST_TAG);
    let namespace = namespace.trim_end_matches('/');
    if namespace.is_empty() {
        format!("{}:{}", name, tag)
    } else {
        format!("{}/{}:{}", namespace, name, tag)
    }
}
