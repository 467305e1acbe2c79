//! JWT service for identity token issuance and validation
//!
//! Tokens are signed with HS256 using a single server-held secret. Validation
//! only accepts HS256, so a token whose header names another algorithm is
//! rejected before its claims are looked at.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind, get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Token validity window: 7 days
pub const DEFAULT_TOKEN_EXPIRY: u64 = 7 * 24 * 60 * 60;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token expiration time in seconds (default: 7 days)
    pub token_expiry: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_ENCRYPTION_KEY`: Signing secret (required, must not be empty)
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_ENCRYPTION_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_ENCRYPTION_KEY environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("JWT_ENCRYPTION_KEY environment variable is empty");
        }

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub username: String,
    /// User ID
    pub user_id: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// The signing key is missing or empty
    #[error("Token signing key is not configured")]
    MissingKey,

    /// Bad signature, wrong algorithm or malformed token
    #[error("Invalid token")]
    Invalid,

    /// The token is past its expiry
    #[error("Token has expired")]
    Expired,

    /// Signing failed
    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    ///
    /// Fails with [`TokenError::MissingKey`] rather than signing with an empty
    /// secret.
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        if config.secret.trim().is_empty() {
            return Err(TokenError::MissingKey);
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Issue a token for a user, valid for the configured window
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, TokenError> {
        let now = get_current_timestamp();
        let claims = Claims {
            username: username.to_string(),
            user_id,
            iat: now,
            exp: now + self.config.token_expiry,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                other => {
                    debug!(reason = ?other, "Rejected token");
                    TokenError::Invalid
                }
            })
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        })
        .unwrap()
    }

    fn sign(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let jwt = service("test-secret");
        let user_id = Uuid::new_v4();

        let token = jwt.issue(user_id, "alice").unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_EXPIRY);
    }

    #[test]
    fn flipped_signature_is_invalid() {
        let jwt = service("test-secret");
        let token = jwt.issue(Uuid::new_v4(), "alice").unwrap();

        let mut bytes = token.into_bytes();
        let last = bytes.len() - 2;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(jwt.validate(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn token_from_another_key_is_invalid() {
        let token = service("other-secret")
            .issue(Uuid::new_v4(), "alice")
            .unwrap();

        assert!(matches!(
            service("test-secret").validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let now = get_current_timestamp();
        let claims = Claims {
            username: "alice".to_string(),
            user_id: Uuid::new_v4(),
            iat: now,
            exp: now + 60,
        };
        let token = sign(&claims, Algorithm::HS512, "test-secret");

        assert!(matches!(
            service("test-secret").validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = get_current_timestamp();
        let claims = Claims {
            username: "alice".to_string(),
            user_id: Uuid::new_v4(),
            iat: now - 3600,
            exp: now - 60,
        };
        let token = sign(&claims, Algorithm::HS256, "test-secret");

        assert!(matches!(
            service("test-secret").validate(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let jwt = service("test-secret");
        assert!(matches!(jwt.validate(""), Err(TokenError::Invalid)));
        assert!(matches!(jwt.validate("not.a.jwt"), Err(TokenError::Invalid)));
    }

    #[test]
    fn empty_secret_is_refused() {
        let result = JwtService::new(JwtConfig {
            secret: String::new(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        });
        assert!(matches!(result, Err(TokenError::MissingKey)));
    }

    #[test]
    #[serial]
    fn config_from_env() {
        unsafe {
            std::env::set_var("JWT_ENCRYPTION_KEY", "from-env");
            std::env::remove_var("JWT_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "from-env");
        assert_eq!(config.token_expiry, DEFAULT_TOKEN_EXPIRY);
        assert!(!format!("{config:?}").contains("from-env"));

        unsafe {
            std::env::remove_var("JWT_ENCRYPTION_KEY");
        }
    }

    #[test]
    #[serial]
    fn config_requires_a_non_empty_key() {
        unsafe {
            std::env::remove_var("JWT_ENCRYPTION_KEY");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_ENCRYPTION_KEY", "  ");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("JWT_ENCRYPTION_KEY");
        }
    }
}
