//! # rp-auth-jwt
//!
//! Argon2 + JWT implementation of `AuthProvider`.
//! Handles salted password hashing and the signed session token carried in
//! the `token` cookie.

use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rp_core::models::Identity;
use rp_core::traits::AuthProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl JwtAuthProvider {
    /// Accepts the signing secret (e.g. from `RP__AUTH__JWT_SECRET`) and the
    /// token lifetime.
    pub fn new(secret: &SecretString, token_ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }

    fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        encode(&Header::default(), claims, &self.encoding).context("token signing failed")
    }
}

impl AuthProvider for JwtAuthProvider {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("password hashing failed: {e}"))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("stored password hash is malformed: {e}");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_token(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        })
    }

    fn verify_token(&self, token: &str) -> anyhow::Result<Identity> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .context("token rejected")?
            .claims;
        let user_id = Uuid::parse_str(&claims.sub).context("invalid user ID in token")?;
        Ok(Identity {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtAuthProvider {
        JwtAuthProvider::new(&SecretString::from("test-secret".to_string()), Duration::hours(1))
    }

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::now_v7(),
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let auth = provider();
        let first = auth.hash_password("p").unwrap();
        let second = auth.hash_password("p").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
        assert!(auth.verify_password("p", &first));
        assert!(auth.verify_password("p", &second));
        assert!(!auth.verify_password("wrong", &first));
        assert!(!auth.verify_password("", &first));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!provider().verify_password("p", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let auth = provider();
        let who = identity();
        let token = auth.issue_token(&who).unwrap();
        assert_eq!(auth.verify_token(&token).unwrap(), who);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let who = identity();
        let foreign = JwtAuthProvider::new(&SecretString::from("other".to_string()), Duration::hours(1))
            .issue_token(&who)
            .unwrap();
        assert!(provider().verify_token(&foreign).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = provider();
        let now = Utc::now();
        let stale = auth
            .sign(&Claims {
                sub: Uuid::now_v7().to_string(),
                email: "a@x.com".into(),
                iat: (now - Duration::hours(3)).timestamp(),
                exp: (now - Duration::hours(2)).timestamp(),
            })
            .unwrap();
        assert!(auth.verify_token(&stale).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(provider().verify_token("invalid.token.here").is_err());
    }
}
