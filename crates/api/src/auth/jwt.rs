//! Token primitives: short-lived HS256 access tokens and opaque refresh
//! tokens.
//!
//! The sessions table never sees a refresh token in the clear; it stores
//! the SHA-256 digest, so a leaked dump cannot be replayed as a login.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use atelio_core::types::DbId;

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// Role name: `admin`, `client`, or `partner`.
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Per-token UUID, kept for audit trails.
    pub jti: String,
}

const DEFAULT_ACCESS_TTL_MINS: i64 = 15;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Signing secret and token lifetimes, loaded once at startup.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_mins: i64,
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty), `JWT_ACCESS_EXPIRY_MINS`
    /// (default 15) and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or empty; a server without a
    /// signing key must not come up.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_ttl_mins: env_i64("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_TTL_MINS),
            refresh_ttl_days: env_i64("JWT_REFRESH_EXPIRY_DAYS", DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Issue a signed access token for a user.
    pub fn issue(&self, user_id: DbId, role: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp: iat + self.access_ttl_mins * 60,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature and expiry, returning the claims of a valid token.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

fn env_i64(var: &str, default: i64) -> i64 {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{var} must be a valid i64")),
        Err(_) => default,
    }
}

/// Mint a fresh refresh token, returning `(plaintext, digest)`.
///
/// The plaintext goes to the client; only the digest is persisted.
pub fn new_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let digest = refresh_token_digest(&plaintext);
    (plaintext, digest)
}

/// SHA-256 hex digest of a refresh token, as stored in the sessions table.
pub fn refresh_token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-signing-secret".into(),
            access_ttl_mins: 15,
            refresh_ttl_days: 7,
        }
    }

    #[test]
    fn issued_tokens_verify_and_carry_claims() {
        let cfg = config();
        let token = cfg.issue(42, "client").unwrap();

        let claims = cfg.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "client");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let cfg = config();

        // Hand-roll a token expired well beyond the default leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "client".into(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();

        assert!(cfg.verify(&token).is_err());
    }

    #[test]
    fn tokens_do_not_verify_across_secrets() {
        let cfg_a = config();
        let cfg_b = JwtConfig {
            secret: "a-different-secret".into(),
            ..config()
        };

        let token = cfg_a.issue(1, "client").unwrap();
        assert!(cfg_b.verify(&token).is_err());
    }

    #[test]
    fn refresh_token_digest_is_stable_sha256() {
        let (plaintext, digest) = new_refresh_token();

        assert_eq!(refresh_token_digest(&plaintext), digest);
        assert_eq!(digest.len(), 64);
    }
}
