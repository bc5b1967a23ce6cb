//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Validated Role
//!     → dispatcher.rs (choose selector by role)
//!         Privileged → pinned backend, only if alive
//!         otherwise  → round-robin cursor + failover scan
//!     → record served/dispatched counters
//!     → Forwarder (single attempt)
//!     → Return: backend response, 503, or 502
//! ```
//!
//! # Design Decisions
//! - Selection and forwarding are one non-retried unit
//! - The dispatcher never changes liveness; only the health monitor does
//! - No pool-wide lock is held across a routing decision

pub mod dispatcher;

pub use dispatcher::Dispatcher;
