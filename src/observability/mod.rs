//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stdout or file)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log file / stdout
//!     → Metrics endpoint (Prometheus scrape)
//!     → Stats surface (admin module, pool snapshot)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through request logs
//! - Metrics are cheap (atomic increments) and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
