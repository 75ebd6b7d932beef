//! # cf-auth-simple
//!
//! Argon2-based implementation of `SessionAuth`. Password hashes use
//! argon2id with a per-hash random salt; session tokens are MAC'd with
//! HMAC-SHA256 under a secret supplied at startup.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::traits::SessionAuth;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime in seconds (30 days).
const TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;

pub struct SimpleSessionAuth {
    /// Secret for the token MAC; rotating it invalidates every session.
    secret: Vec<u8>,
}

impl SimpleSessionAuth {
    /// Accepts the secret (e.g., from an environment variable).
    pub fn new(secret: &str) -> Self {
        SimpleSessionAuth {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac_hex(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn token_for(&self, user_id: Uuid, expires_at: i64) -> String {
        let payload = format!("{}.{}", user_id.simple(), expires_at);
        let mac = self.mac_hex(&payload);
        format!("{payload}.{mac}")
    }
}

impl SessionAuth for SimpleSessionAuth {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    fn issue_token(&self, user_id: Uuid) -> String {
        self.token_for(user_id, Utc::now().timestamp() + TOKEN_TTL_SECS)
    }

    /// Token shape: `<user_id>.<expiry_unix>.<hmac_hex>`. Anything that does
    /// not parse, fails the MAC, or has expired yields `None`.
    fn verify_token(&self, token: &str) -> Option<Uuid> {
        let (payload, mac_hex) = token.rsplit_once('.')?;
        let (user_part, expiry_part) = payload.split_once('.')?;

        let user_id = Uuid::parse_str(user_part).ok()?;
        let expires_at: i64 = expiry_part.parse().ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        let expected = hex::decode(mac_hex).ok()?;
        mac.verify_slice(&expected).ok()?;

        if expires_at <= Utc::now().timestamp() {
            return None;
        }
        Some(user_id)
    }
}
