//! Docker Engine API adapter over the shared hyper client.
//!
//! Talks to the engine's TCP endpoint (`runtime.host`), versioned with
//! `runtime.api_version` when set.

use std::time::Duration;

use bytes::Bytes;
use hyper::Method;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::runtime::ContainerRuntime;
use super::types::{
    ContainerConfig, ContainerSummary, CreateResponse, HostConfig, LogsOptions, NetworkingConfig,
    PullEvent, PullEventWire, RemoveOptions,
};
use super::RuntimeError;
use crate::config::Runtime;
use crate::http::{self, HttpResponse, HyperClient};

const JSON: (&str, &str) = ("content-type", "application/json");

pub struct DockerEngine {
    client: HyperClient,
    base: String,
    timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateBody<'a> {
    #[serde(flatten)]
    config: &'a ContainerConfig,
    host_config: &'a HostConfig,
    networking_config: &'a NetworkingConfig,
}

impl DockerEngine {
    /// `timeout` bounds the transport of one call. Use the longest runtime
    /// timeout so that the lifecycle's per-operation bound is the effective one.
    pub fn new(client: HyperClient, cfg: &Runtime, timeout: Duration) -> Self {
        let host = cfg.host.trim_end_matches('/');
        let base = match cfg.api_version.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => format!("{}/{}", host, v.trim_start_matches('/')),
            _ => host.to_string(),
        };
        Self {
            client,
            base,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    async fn call(
        &self,
        op: &'static str,
        method: Method,
        path_and_query: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, RuntimeError> {
        let uri = format!("{}{}", self.base, path_and_query);
        let headers: &[(&str, &str)] = if body.is_some() { &[JSON] } else { &[] };
        let resp = http::send(&self.client, method, &uri, headers, body.map(Bytes::from), self.timeout).await?;
        debug!(
            component = "docker",
            event = "call",
            op,
            status = resp.status,
            "engine call completed"
        );
        Ok(resp)
    }

    /// Fails unless the status is 2xx or listed in `also_ok`.
    fn expect_ok(op: &'static str, resp: &HttpResponse, also_ok: &[u16]) -> Result<(), RuntimeError> {
        if resp.is_success() || also_ok.contains(&resp.status) {
            return Ok(());
        }
        Err(RuntimeError::Api {
            op,
            status: resp.status,
            message: engine_message(&resp.body),
        })
    }

    fn encode<T: Serialize>(op: &'static str, value: &T) -> Result<Vec<u8>, RuntimeError> {
        serde_json::to_vec(value).map_err(|e| RuntimeError::Decode {
            op,
            reason: e.to_string(),
        })
    }
}

/// Extracts `message` from an engine error body, falling back to the raw text.
fn engine_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

fn enc(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Parses the newline-delimited JSON progress stream of a pull.
pub fn parse_pull_events(body: &[u8]) -> Result<Vec<PullEvent>, RuntimeError> {
    let text = String::from_utf8_lossy(body);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<PullEventWire>(line)
                .map(PullEvent::from)
                .map_err(|e| RuntimeError::Decode {
                    op: "pull",
                    reason: e.to_string(),
                })
        })
        .collect()
}

#[async_trait::async_trait]
impl ContainerRuntime for DockerEngine {
    async fn list_containers(&self, name_filter: &str) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let filters = json!({ "name": [name_filter] }).to_string();
        let path = format!("/containers/json?all=true&filters={}", enc(&filters));
        let resp = self.call("list", Method::GET, &path, None).await?;
        Self::expect_ok("list", &resp, &[])?;
        serde_json::from_slice(&resp.body).map_err(|e| RuntimeError::Decode {
            op: "list",
            reason: e.to_string(),
        })
    }

    async fn pull_image(&self, reference: &str) -> Result<Vec<PullEvent>, RuntimeError> {
        let path = format!("/images/create?fromImage={}", enc(reference));
        let resp = self.call("pull", Method::POST, &path, None).await?;
        Self::expect_ok("pull", &resp, &[])?;
        parse_pull_events(&resp.body)
    }

    async fn create_container(
        &self,
        config: &ContainerConfig,
        host_config: &HostConfig,
        network_config: &NetworkingConfig,
        platform: Option<&str>,
        name: &str,
    ) -> Result<CreateResponse, RuntimeError> {
        let mut path = format!("/containers/create?name={}", enc(name));
        if let Some(platform) = platform.filter(|p| !p.is_empty()) {
            path.push_str(&format!("&platform={}", enc(platform)));
        }
        let body = Self::encode(
            "create",
            &CreateBody {
                config,
                host_config,
                networking_config: network_config,
            },
        )?;
        let resp = self.call("create", Method::POST, &path, Some(body)).await?;
        Self::expect_ok("create", &resp, &[])?;
        serde_json::from_slice(&resp.body).map_err(|e| RuntimeError::Decode {
            op: "create",
            reason: e.to_string(),
        })
    }

    async fn start_container(&self, id: &str) -> Result<(), RuntimeError> {
        let path = format!("/containers/{}/start", enc(id));
        let resp = self.call("start", Method::POST, &path, None).await?;
        // 304: already started
        Self::expect_ok("start", &resp, &[304])
    }

    async fn stop_container(&self, id: &str, signal: &str) -> Result<(), RuntimeError> {
        let path = format!("/containers/{}/stop?signal={}&t=0", enc(id), enc(signal));
        let resp = self.call("stop", Method::POST, &path, None).await?;
        // 304: already stopped
        Self::expect_ok("stop", &resp, &[304])
    }

    async fn remove_container(&self, id: &str, opts: RemoveOptions) -> Result<(), RuntimeError> {
        let path = format!("/containers/{}?force={}&v={}", enc(id), opts.force, opts.remove_volumes);
        let resp = self.call("remove", Method::DELETE, &path, None).await?;
        Self::expect_ok("remove", &resp, &[])
    }

    async fn disconnect_network(&self, network: &str, id: &str, force: bool) -> Result<(), RuntimeError> {
        let path = format!("/networks/{}/disconnect", enc(network));
        let body = Self::encode("disconnect", &json!({ "Container": id, "Force": force }))?;
        let resp = self.call("disconnect", Method::POST, &path, Some(body)).await?;
        Self::expect_ok("disconnect", &resp, &[])
    }

    async fn read_container_logs(&self, id: &str, opts: LogsOptions) -> Result<Bytes, RuntimeError> {
        let path = format!(
            "/containers/{}/logs?stdout={}&stderr={}",
            enc(id),
            opts.stdout,
            opts.stderr
        );
        let resp = self.call("logs", Method::GET, &path, None).await?;
        Self::expect_ok("logs", &resp, &[])?;
        Ok(resp.body)
    }
}
