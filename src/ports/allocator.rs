// Package ports hands out host ports from a pre-reserved pool.
//
// The pool is a contiguous range owned by this process. Ports are issued with a
// bump cursor and never handed out twice, so concurrent resolvers cannot collide.

use std::collections::HashSet;
use std::net::TcpListener;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PortError;

pub const DEFAULT_RANGE_START: u16 = 30000;
pub const DEFAULT_RANGE_END: u16 = 30999;

/// Inclusive range of host ports reserved for deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, PortError> {
        if start == 0 || start > end {
            return Err(PortError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            return 0;
        }
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_RANGE_START,
            end: DEFAULT_RANGE_END,
        }
    }
}

struct Pool {
    cursor: u32,
    issued: HashSet<u16>,
}

/// Serialized allocator over a [`PortRange`].
pub struct PortAllocator {
    range: PortRange,
    check_host: bool,
    pool: Mutex<Pool>,
}

impl PortAllocator {
    /// Creates an allocator that trusts the range to be free on the host.
    pub fn new(range: PortRange) -> Self {
        Self {
            range,
            check_host: false,
            pool: Mutex::new(Pool {
                cursor: range.start as u32,
                issued: HashSet::new(),
            }),
        }
    }

    /// Creates an allocator that additionally skips ports already bound on the host.
    pub fn with_host_check(range: PortRange) -> Self {
        let mut allocator = Self::new(range);
        allocator.check_host = true;
        allocator
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Allocates `count` distinct ports. All-or-nothing: on exhaustion no port is consumed.
    pub fn allocate(&self, count: usize) -> Result<Vec<u16>, PortError> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut pool = self.pool.lock();
        let mut picked = Vec::with_capacity(count);
        let mut candidate = pool.cursor;

        while candidate <= self.range.end as u32 && picked.len() < count {
            let port = candidate as u16;
            candidate += 1;
            if pool.issued.contains(&port) {
                continue;
            }
            if self.check_host && !is_free_on_host(port) {
                debug!(
                    component = "ports",
                    event = "port_busy",
                    port,
                    "skipping port bound by another process"
                );
                continue;
            }
            picked.push(port);
        }

        if picked.len() < count {
            return Err(PortError::Exhausted {
                requested: count,
                available: picked.len(),
            });
        }

        pool.cursor = candidate;
        pool.issued.extend(picked.iter().copied());
        Ok(picked)
    }

    /// Allocates a single port.
    pub fn allocate_one(&self) -> Result<u16, PortError> {
        let ports = self.allocate(1)?;
        Ok(ports[0])
    }

    /// Marks an explicitly configured port as taken so the pool never hands it
    /// out. Returns `false` if it was already issued.
    pub fn reserve(&self, port: u16) -> bool {
        self.pool.lock().issued.insert(port)
    }

    /// Ports issued so far, sorted.
    pub fn issued(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.pool.lock().issued.iter().copied().collect();
        ports.sort_unstable();
        ports
    }
}

fn is_free_on_host(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}
