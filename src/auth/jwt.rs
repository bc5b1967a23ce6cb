//! HS256 bearer tokens carrying a `role` claim.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Role, RoleExtractor};

const BEARER_PREFIX: &str = "Bearer ";

/// Default lifetime of issued tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Verifies tokens signed with a shared secret.
pub struct JwtRoleExtractor {
    key: DecodingKey,
    validation: Validation,
}

impl JwtRoleExtractor {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl RoleExtractor for JwtRoleExtractor {
    fn extract_role(&self, header_value: &str) -> Result<Role, AuthError> {
        let token = header_value.trim();
        let token = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();
        if token.is_empty() || token == BEARER_PREFIX.trim_end() {
            return Err(AuthError::Missing);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        data.claims.role.parse()
    }
}

/// Sign a token for `role` valid for `ttl`.
pub fn issue_token(
    role: Role,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        role: role.claim().to_string(),
        iat: now,
        exp: now + ttl.as_secs(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    #[test]
    fn test_issued_tokens_extract_their_role() {
        let extractor = JwtRoleExtractor::new(SECRET);
        for role in Role::ALL {
            let token = issue_token(role, SECRET, DEFAULT_TOKEN_TTL).unwrap();
            let header = format!("Bearer {}", token);
            assert_eq!(extractor.extract_role(&header), Ok(role));
        }
    }

    #[test]
    fn test_prefix_is_optional() {
        let extractor = JwtRoleExtractor::new(SECRET);
        let token = issue_token(Role::User, SECRET, DEFAULT_TOKEN_TTL).unwrap();
        assert_eq!(extractor.extract_role(&token), Ok(Role::User));
    }

    #[test]
    fn test_missing_credential() {
        let extractor = JwtRoleExtractor::new(SECRET);
        assert_eq!(extractor.extract_role(""), Err(AuthError::Missing));
        assert_eq!(extractor.extract_role("Bearer "), Err(AuthError::Missing));
        assert_eq!(extractor.extract_role("   "), Err(AuthError::Missing));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let extractor = JwtRoleExtractor::new(SECRET);
        let err = extractor.extract_role("Bearer not.a.token").unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let extractor = JwtRoleExtractor::new(SECRET);
        let token = issue_token(Role::Privileged, "other-secret", DEFAULT_TOKEN_TTL).unwrap();
        let err = extractor.extract_role(&token).unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_expired_token_is_malformed() {
        let extractor = JwtRoleExtractor::new(SECRET);
        let claims = Claims {
            role: "User".into(),
            iat: now() - 7200,
            exp: now() - 3600,
        };
        let err = extractor.extract_role(&sign(&claims, SECRET)).unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn test_unknown_role_claim() {
        let extractor = JwtRoleExtractor::new(SECRET);
        let claims = Claims {
            role: "Superuser".into(),
            iat: now(),
            exp: now() + 600,
        };
        assert_eq!(
            extractor.extract_role(&sign(&claims, SECRET)),
            Err(AuthError::UnrecognizedRole("Superuser".into()))
        );
    }
}
