// Package readiness verifies that deployed containers answer their health endpoint.
//
// A check is a fixed number of attempts with a fixed pause between them. Only
// a 200 counts as ready; any other status or a transport error is retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use super::probe::HttpProbe;
use super::ReadinessError;
use crate::config::Readiness;

pub const DEFAULT_MAX_RETRIES: u32 = 50;
pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);
pub const HEALTH_PATH: &str = "/admin/health";

/// Named health endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub name: String,
    pub url: String,
}

impl ProbeTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Health endpoint of a container exposed on `port` of this host.
    pub fn local(name: impl Into<String>, port: u16) -> Self {
        Self::new(name, health_url(port))
    }
}

pub fn health_url(port: u16) -> String {
    format!("http://localhost:{}{}", port, HEALTH_PATH)
}

#[derive(Clone)]
pub struct ReadinessProbe {
    probe: Arc<dyn HttpProbe>,
    max_retries: u32,
    wait: Duration,
}

impl ReadinessProbe {
    pub fn new(probe: Arc<dyn HttpProbe>, cfg: &Readiness) -> Self {
        Self::with_retries(probe, cfg.max_retries, cfg.wait)
    }

    /// `max_retries` below one is raised to one.
    pub fn with_retries(probe: Arc<dyn HttpProbe>, max_retries: u32, wait: Duration) -> Self {
        Self {
            probe,
            max_retries: max_retries.max(1),
            wait,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Checks `name` on `localhost:<port>`.
    pub async fn check(&self, name: &str, port: u16) -> Result<(), ReadinessError> {
        self.check_url(name, &health_url(port)).await
    }

    /// Makes at most `max_retries` health calls against `url`, pausing `wait`
    /// between attempts, and returns on the first 200.
    pub async fn check_url(&self, name: &str, url: &str) -> Result<(), ReadinessError> {
        for attempt in 1..=self.max_retries {
            match self.probe.ping(url).await {
                Ok(200) => {
                    info!(
                        component = "readiness",
                        event = "ready",
                        name = %name,
                        attempt,
                        "container is ready"
                    );
                    return Ok(());
                }
                Ok(status) => debug!(
                    component = "readiness",
                    event = "not_ready",
                    name = %name,
                    url = %url,
                    attempt,
                    status,
                    "health check returned non-200"
                ),
                Err(e) => debug!(
                    component = "readiness",
                    event = "probe_failed",
                    name = %name,
                    url = %url,
                    attempt,
                    error = %e,
                    "health check failed"
                ),
            }
            if attempt < self.max_retries {
                tokio::time::sleep(self.wait).await;
            }
        }

        warn!(
            component = "readiness",
            event = "gave_up",
            name = %name,
            attempts = self.max_retries,
            "container did not become ready"
        );
        Err(ReadinessError::ModuleNotReady {
            name: name.to_string(),
            attempts: self.max_retries,
        })
    }

    /// Checks a module and its sidecar concurrently and returns the first
    /// failure once both checks have finished.
    ///
    /// Each check reports through a channel sized for both results with a
    /// non-blocking send. A result that does not fit is logged and dropped.
    pub async fn check_pair(&self, module: ProbeTarget, sidecar: ProbeTarget) -> Result<(), ReadinessError> {
        let (tx, mut rx) = mpsc::channel::<ReadinessError>(2);

        let mut handles = Vec::with_capacity(2);
        for target in [module, sidecar] {
            let probe = self.clone();
            let tx = tx.clone();
            let name = target.name.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = probe.check_url(&target.name, &target.url).await {
                    report(&tx, e);
                }
            });
            handles.push((name, handle));
        }
        drop(tx);

        let mut aborted = None;
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                aborted.get_or_insert(ReadinessError::Aborted {
                    name,
                    reason: e.to_string(),
                });
            }
        }

        if let Ok(first) = rx.try_recv() {
            return Err(first);
        }
        match aborted {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn report(tx: &mpsc::Sender<ReadinessError>, err: ReadinessError) {
    match tx.try_send(err) {
        Ok(()) => {}
        Err(TrySendError::Full(dropped)) | Err(TrySendError::Closed(dropped)) => warn!(
            component = "readiness",
            event = "result_dropped",
            error = %dropped,
            "readiness result could not be reported"
        ),
    }
}
