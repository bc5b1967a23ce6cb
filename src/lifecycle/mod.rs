//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger → broadcast to HTTP server and health monitor → both exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Pool state is in-memory only; nothing to flush on exit
//! - The server stops accepting, drains in-flight requests, then returns

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
