//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → request.rs (correlation ID)
//!     → [role extraction] → [dispatcher picks backend]
//!     → forward.rs (rewrite target, relay response)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::Forwarder;
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
