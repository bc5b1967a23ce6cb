//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Expose the narrow mutation contract (liveness, served counters)
//! - Hold the shared round-robin cursor and the dispatched-request count

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;
use crate::load_balancer::backend::{Backend, BackendSnapshot, HealthState};

/// Errors building a pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("backend pool must contain at least one backend")]
    Empty,

    #[error("privileged index {index} out of range for pool of {len}")]
    PrivilegedOutOfRange { index: usize, len: usize },

    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Point-in-time view of the whole pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub backends: Vec<BackendSnapshot>,
    pub dispatched: u64,
}

/// The fixed set of backends requests are balanced across.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    privileged: usize,
    /// Round-robin cursor. Only ever increases.
    cursor: AtomicU64,
    /// Successful routing decisions, all roles.
    dispatched: AtomicU64,
}

impl BackendPool {
    /// Create a pool from base URLs, pinning privileged traffic to `privileged`.
    pub fn new(urls: Vec<Url>, privileged: usize) -> Result<Self, PoolError> {
        if urls.is_empty() {
            return Err(PoolError::Empty);
        }
        if privileged >= urls.len() {
            return Err(PoolError::PrivilegedOutOfRange {
                index: privileged,
                len: urls.len(),
            });
        }

        let backends = urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| Arc::new(Backend::new(index, url, index == privileged)))
            .collect();

        Ok(Self {
            backends,
            privileged,
            cursor: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
        })
    }

    /// Create a pool from configuration.
    ///
    /// The backend flagged `privileged` is pinned; when none is flagged the
    /// first backend is.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, PoolError> {
        let urls = configs
            .iter()
            .map(|c| {
                Url::parse(&c.url).map_err(|source| PoolError::InvalidUrl {
                    url: c.url.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let privileged = configs.iter().position(|c| c.privileged).unwrap_or(0);
        Self::new(urls, privileged)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// All backends, in pool order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Index of the designated privileged backend. Fixed at construction.
    pub fn privileged_index(&self) -> usize {
        self.privileged
    }

    pub fn privileged(&self) -> &Arc<Backend> {
        &self.backends[self.privileged]
    }

    /// Snapshot every backend. Each backend's lock is held only for its own copy.
    pub fn list_backends(&self) -> Vec<BackendSnapshot> {
        self.backends.iter().map(|b| b.snapshot()).collect()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            backends: self.list_backends(),
            dispatched: self.dispatched(),
        }
    }

    /// Mark a backend alive. Returns its previous state, or `None` for an unknown index.
    pub fn mark_alive(&self, index: usize) -> Option<HealthState> {
        self.get(index).map(|b| b.mark_alive())
    }

    /// Mark a backend down. Returns its previous state, or `None` for an unknown index.
    pub fn mark_down(&self, index: usize) -> Option<HealthState> {
        self.get(index).map(|b| b.mark_down())
    }

    pub fn increment_served(&self, index: usize) -> Option<u64> {
        self.get(index).map(|b| b.increment_served())
    }

    /// Record a successful routing decision to `index`.
    pub fn record_dispatch(&self, index: usize) {
        if self.increment_served(index).is_some() {
            self.dispatched.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Claim the next round-robin starting offset.
    pub fn advance_cursor(&self) -> u64 {
        self.cursor.fetch_add(1, Ordering::Relaxed)
    }

    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}
