//! Single request helper over [`HyperClient`] with a bounded timeout.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::{HeaderMap, Method, Request, Uri};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::client::HyperClient;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request to {uri}: {reason}")]
    Build { uri: String, reason: String },
    #[error("request to {uri} timed out after {timeout:?}")]
    Timeout { uri: String, timeout: Duration },
    #[error("request to {uri} failed: {reason}")]
    Transport { uri: String, reason: String },
}

/// Status, headers and fully collected body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and collects the response body. Both the exchange and the
/// body read happen inside the same `timeout_duration`.
pub async fn send(
    client: &HyperClient,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Bytes>,
    timeout_duration: Duration,
) -> Result<HttpResponse, RequestError> {
    let parsed: Uri = uri.parse().map_err(|e: hyper::http::uri::InvalidUri| RequestError::Build {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let mut builder = Request::builder().method(method.clone()).uri(parsed);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let req_body: BoxBody<Bytes, hyper::Error> = match body {
        Some(bytes) => Full::new(bytes)
            .map_err(|never: std::convert::Infallible| match never {})
            .boxed(),
        None => Empty::<Bytes>::new()
            .map_err(|never: std::convert::Infallible| match never {})
            .boxed(),
    };

    let req = builder.body(req_body).map_err(|e| RequestError::Build {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    let exchange = async {
        let response = client.request(req).await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let (parts, body_stream) = response.into_parts();
        let body = body_stream.collect().await.map_err(|e| e.to_string())?.to_bytes();
        Ok::<_, String>(HttpResponse {
            status,
            headers: parts.headers,
            body,
        })
    };

    match timeout(timeout_duration, exchange).await {
        Ok(Ok(resp)) => {
            debug!(
                component = "http",
                event = "response",
                method = %method,
                uri = %uri,
                status = resp.status,
                "request completed"
            );
            Ok(resp)
        }
        Ok(Err(reason)) => {
            debug!(
                component = "http",
                event = "transport_error",
                method = %method,
                uri = %uri,
                error = %reason,
                "request failed"
            );
            Err(RequestError::Transport {
                uri: uri.to_string(),
                reason,
            })
        }
        Err(_) => {
            warn!(
                component = "http",
                event = "timeout",
                method = %method,
                uri = %uri,
                timeout = ?timeout_duration,
                "request timed out"
            );
            Err(RequestError::Timeout {
                uri: uri.to_string(),
                timeout: timeout_duration,
            })
        }
    }
}
