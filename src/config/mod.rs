//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (command-line overrides: port, backends, log file)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the backend pool is never resized
//! - All fields have defaults so a bare invocation reproduces the
//!   three-backend local deployment
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BalancerConfig;
pub use schema::ListenerConfig;
pub use schema::BackendConfig;
pub use schema::HealthCheckConfig;
pub use schema::AuthConfig;
pub use schema::ForwardConfig;
pub use schema::AdminConfig;
pub use schema::ObservabilityConfig;
pub use loader::{finalize, load_config, ConfigError};
