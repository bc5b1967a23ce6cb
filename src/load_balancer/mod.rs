//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Role extracted → dispatcher picks a selector
//!     → pool.rs (fixed, ordered backends + round-robin cursor)
//!     → Apply selection strategy:
//!         - pinned.rs (designated privileged backend, no fallback)
//!         - round_robin.rs (rotate, fail over to next alive backend)
//!     → backend.rs (liveness + counters of the chosen backend)
//!     → Return backend or None
//! ```
//!
//! # Design Decisions
//! - Selectors are stateless; the pool owns the cursor and all counters
//! - Each backend guards its own liveness record (no pool-wide lock)
//! - Down backends are skipped, never evicted
//! - Selection never suspends: it is a bounded in-memory scan

pub mod backend;
pub mod pinned;
pub mod pool;
pub mod round_robin;

use std::fmt::Debug;
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, pool::BackendPool};

/// A backend selection strategy.
pub trait Selector: Send + Sync + Debug {
    /// Pick a live backend from the pool, or `None` if no eligible one is alive.
    fn select(&self, pool: &BackendPool) -> Option<Arc<Backend>>;
}
