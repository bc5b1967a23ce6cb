//! Round-robin selection with failover.

use std::sync::Arc;
use crate::load_balancer::{Selector, backend::Backend, pool::BackendPool};

/// Round-robin selector.
/// Claims a starting offset from the pool cursor, then scans forward
/// (wrapping once) for the first alive backend.
#[derive(Debug, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for RoundRobin {
    fn select(&self, pool: &BackendPool) -> Option<Arc<Backend>> {
        let backends = pool.backends();
        if backends.is_empty() {
            return None;
        }

        let len = backends.len();
        let start = (pool.advance_cursor() % len as u64) as usize;

        for i in 0..len {
            let backend = &backends[(start + i) % len];
            if backend.is_alive() {
                return Some(backend.clone());
            }
        }
        None
    }
}
