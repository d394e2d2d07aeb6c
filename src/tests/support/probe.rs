// Scripted HTTP probe for readiness tests.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::http::RequestError;
use crate::readiness::HttpProbe;

/// Answers each URL from its script, then with the default status forever.
pub struct ScriptedProbe {
    default_status: u16,
    scripts: Mutex<HashMap<String, VecDeque<Result<u16, RequestError>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new(default_status: u16) -> Self {
        Self {
            default_status,
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always healthy.
    pub fn healthy() -> Self {
        Self::new(200)
    }

    pub fn script(self, url: &str, statuses: &[u16]) -> Self {
        self.scripts
            .lock()
            .entry(url.to_string())
            .or_default()
            .extend(statuses.iter().map(|s| Ok(*s)));
        self
    }

    pub fn transport_errors(self, url: &str, times: usize) -> Self {
        let mut scripts = self.scripts.lock();
        let queue = scripts.entry(url.to_string()).or_default();
        for _ in 0..times {
            queue.push_back(Err(RequestError::Transport {
                uri: url.to_string(),
                reason: "connection refused".to_string(),
            }));
        }
        drop(scripts);
        self
    }

    pub fn total(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|u| *u == url).count()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl HttpProbe for ScriptedProbe {
    async fn ping(&self, url: &str) -> Result<u16, RequestError> {
        self.calls.lock().push(url.to_string());
        let next = self.scripts.lock().get_mut(url).and_then(VecDeque::pop_front);
        next.unwrap_or(Ok(self.default_status))
    }
}
