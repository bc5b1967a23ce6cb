//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track liveness (Alive/Down) and consecutive probe failures
//! - Count requests dispatched to it

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Liveness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Alive,
    Down,
}

/// Mutable liveness record, guarded per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Liveness {
    state: HealthState,
    consecutive_failures: u64,
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Position in the pool.
    pub index: usize,
    /// Base URL requests are forwarded to.
    pub url: Url,
    /// Whether privileged traffic is pinned here.
    pub privileged: bool,

    liveness: RwLock<Liveness>,
    served: AtomicU64,
}

/// Point-in-time copy of one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSnapshot {
    pub index: usize,
    pub url: String,
    pub privileged: bool,
    pub alive: bool,
    pub consecutive_failures: u64,
    pub served: u64,
}

impl Backend {
    /// Create a new backend. Backends start out alive.
    pub fn new(index: usize, url: Url, privileged: bool) -> Self {
        Self {
            index,
            url,
            privileged,
            liveness: RwLock::new(Liveness {
                state: HealthState::Alive,
                consecutive_failures: 0,
            }),
            served: AtomicU64::new(0),
        }
    }

    /// Human-facing label (1-based, as operators number backends).
    pub fn label(&self) -> String {
        format!("backend-{}", self.index + 1)
    }

    pub fn state(&self) -> HealthState {
        self.liveness.read().state
    }

    pub fn is_alive(&self) -> bool {
        self.state() == HealthState::Alive
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.liveness.read().consecutive_failures
    }

    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    /// Record a successful probe. Returns the previous state.
    pub fn mark_alive(&self) -> HealthState {
        let mut liveness = self.liveness.write();
        let previous = liveness.state;
        liveness.state = HealthState::Alive;
        liveness.consecutive_failures = 0;
        previous
    }

    /// Record a failed probe. Returns the previous state.
    pub fn mark_down(&self) -> HealthState {
        let mut liveness = self.liveness.write();
        let previous = liveness.state;
        liveness.state = HealthState::Down;
        liveness.consecutive_failures += 1;
        previous
    }

    /// Count one request dispatched to this backend.
    pub fn increment_served(&self) -> u64 {
        self.served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> BackendSnapshot {
        let liveness = *self.liveness.read();
        BackendSnapshot {
            index: self.index,
            url: self.url.to_string(),
            privileged: self.privileged,
            alive: liveness.state == HealthState::Alive,
            consecutive_failures: liveness.consecutive_failures,
            served: self.served(),
        }
    }
}
