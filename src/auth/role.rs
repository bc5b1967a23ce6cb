//! Request roles.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::auth::AuthError;

/// The closed set of roles a request can carry.
///
/// Claim values are matched case-sensitively: `"Admin"` is the privileged
/// role, `"User"` and `"Client"` are the two round-robin roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// Pinned to the designated privileged backend.
    Privileged,
    User,
    Client,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Privileged, Role::User, Role::Client];

    /// The claim string carried in tokens for this role.
    pub fn claim(&self) -> &'static str {
        match self {
            Role::Privileged => "Admin",
            Role::User => "User",
            Role::Client => "Client",
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Privileged)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.claim())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(claim: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.claim() == claim)
            .ok_or_else(|| AuthError::UnrecognizedRole(claim.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_mapping() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Privileged));
        assert_eq!("User".parse::<Role>(), Ok(Role::User));
        assert_eq!("Client".parse::<Role>(), Ok(Role::Client));
    }

    #[test]
    fn test_claims_are_case_sensitive() {
        assert_eq!(
            "admin".parse::<Role>(),
            Err(AuthError::UnrecognizedRole("admin".into()))
        );
        assert!("Guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_is_privileged() {
        let privileged: Vec<_> = Role::ALL.iter().filter(|r| r.is_privileged()).collect();
        assert_eq!(privileged, vec![&Role::Privileged]);
    }
}
