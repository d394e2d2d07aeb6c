// Package discovery tells the platform's discovery registry where a module's
// sidecar can be reached.

use std::time::Duration;

use bytes::Bytes;
use hyper::Method;
use serde::Serialize;
use tracing::info;

use super::DiscoveryError;
use crate::config::Discovery;
use crate::http::{self, HyperClient};
use crate::model::is_edge;

/// Records the network location of a module. Registrations are idempotent.
#[async_trait::async_trait]
pub trait DiscoveryRegistrar: Send + Sync {
    async fn register_location(
        &self,
        module_id: &str,
        name: &str,
        version: Option<&str>,
        location: &str,
    ) -> Result<(), DiscoveryError>;
}

/// Location a module is registered under: the module itself for edge modules,
/// its sidecar for everything else.
pub fn default_location(module_name: &str, domain: &str, private_port: u16) -> String {
    if is_edge(module_name) {
        format!("http://{}.{}:{}", module_name, domain, private_port)
    } else {
        format!("http://{}-sc.{}:{}", module_name, domain, private_port)
    }
}

#[derive(Debug, Serialize)]
struct DiscoveryPayload<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    location: &'a str,
}

/// `PUT {url}/modules/{id}/discovery` with a JSON body; any 2xx is success.
pub struct HttpDiscoveryRegistrar {
    client: HyperClient,
    url: Option<String>,
    timeout: Duration,
}

impl HttpDiscoveryRegistrar {
    pub fn new(client: HyperClient, cfg: &Discovery) -> Self {
        Self {
            client,
            url: cfg
                .url
                .as_deref()
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            timeout: cfg.timeout,
        }
    }
}

#[async_trait::async_trait]
impl DiscoveryRegistrar for HttpDiscoveryRegistrar {
    async fn register_location(
        &self,
        module_id: &str,
        name: &str,
        version: Option<&str>,
        location: &str,
    ) -> Result<(), DiscoveryError> {
        let base = self.url.as_deref().ok_or(DiscoveryError::NotConfigured)?;
        let uri = format!("{}/modules/{}/discovery", base, urlencoding::encode(module_id));
        let body = serde_json::to_vec(&DiscoveryPayload {
            id: module_id,
            name,
            version,
            location,
        })?;

        let resp = http::send(
            &self.client,
            Method::PUT,
            &uri,
            &[("content-type", "application/json")],
            Some(Bytes::from(body)),
            self.timeout,
        )
        .await?;

        if !resp.is_success() {
            return Err(DiscoveryError::Rejected {
                module_id: module_id.to_string(),
                status: resp.status,
                message: resp.body_text(),
            });
        }

        info!(
            component = "discovery",
            event = "location_registered",
            module_id = %module_id,
            location = %location,
            "discovery location updated"
        );
        Ok(())
    }
}
