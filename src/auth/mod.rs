//! Credential handling subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization header value
//!     → jwt.rs (strip "Bearer ", verify HS256, read `role` claim)
//!     → role.rs (map claim string onto the closed Role set)
//!     → Role handed to the dispatcher, or AuthError (401)
//! ```
//!
//! # Design Decisions
//! - Roles are never persisted; they live for one request only
//! - Extraction is a trait so the dispatcher never sees token internals
//! - Auth failures are client errors and are logged at warn, not error

pub mod jwt;
pub mod role;

pub use jwt::{issue_token, JwtRoleExtractor};
pub use role::Role;

use thiserror::Error;

/// Reasons a credential could not be turned into a role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was supplied.
    #[error("no token provided")]
    Missing,

    /// The credential could not be parsed or failed verification.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token verified but carries a role outside the known set.
    #[error("invalid role claim: {0}")]
    UnrecognizedRole(String),
}

/// Turns a raw credential header value into a [`Role`].
pub trait RoleExtractor: Send + Sync {
    /// Extract the role carried by `header_value`.
    ///
    /// An empty value means the header was absent.
    fn extract_role(&self, header_value: &str) -> Result<Role, AuthError>;
}
