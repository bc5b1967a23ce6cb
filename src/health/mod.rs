//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe every backend concurrently (bounded timeout)
//!     → pool.mark_alive / pool.mark_down
//! ```
//!
//! # State Machine
//! ```text
//! Alive → Down: probe failed (unreachable, timeout, non-success status)
//! Down → Alive: probe succeeded
//! ```
//!
//! # Design Decisions
//! - Probing is the only thing that changes liveness
//! - Backends start Alive and are never evicted
//! - Probe failures are logged and absorbed; the loop never exits on them

pub mod active;

pub use active::{HealthMonitor, ProbeOutcome};
