// Package readiness: the HTTP probe collaborator and its hyper adapter.

use std::time::Duration;

use hyper::Method;

use crate::http::{self, HyperClient, RequestError};

/// Issues one health call and reports the status code.
#[async_trait::async_trait]
pub trait HttpProbe: Send + Sync {
    async fn ping(&self, url: &str) -> Result<u16, RequestError>;
}

/// [`HttpProbe`] over the shared hyper client.
pub struct HttpPinger {
    client: HyperClient,
    timeout: Duration,
}

impl HttpPinger {
    pub fn new(client: HyperClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl HttpProbe for HttpPinger {
    async fn ping(&self, url: &str) -> Result<u16, RequestError> {
        let resp = http::send(&self.client, Method::GET, url, &[], None, self.timeout).await?;
        Ok(resp.status)
    }
}
