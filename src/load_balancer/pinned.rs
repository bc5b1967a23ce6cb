//! Pinned selection for privileged traffic.

use std::sync::Arc;
use crate::load_balancer::{Selector, backend::Backend, pool::BackendPool};

/// Always selects the pool's privileged backend, and only while it is alive.
/// There is no fallback to another backend.
#[derive(Debug, Default)]
pub struct Pinned;

impl Pinned {
    pub fn new() -> Self {
        Self
    }
}

impl Selector for Pinned {
    fn select(&self, pool: &BackendPool) -> Option<Arc<Backend>> {
        let backend = pool.privileged();
        backend.is_alive().then(|| backend.clone())
    }
}
