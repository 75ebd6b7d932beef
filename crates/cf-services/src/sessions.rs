//! # Auth Sessions
//!
//! Sign-up, sign-in, and token-based session restoration over the credential
//! and profile ports. Credential and profile creation are two writes with no
//! surrounding transaction; a failed profile write rolls the credential back
//! so no orphaned credential survives a half-finished sign-up.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cf_core::error::{AppError, Result};
use cf_core::models::{Credential, SessionUser, UserProfile};
use cf_core::traits::{CredentialStore, ProfileRepo, SessionAuth};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Clone)]
pub struct AuthSessions {
    profiles: Arc<dyn ProfileRepo>,
    credentials: Arc<dyn CredentialStore>,
    auth: Arc<dyn SessionAuth>,
}

impl AuthSessions {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        credentials: Arc<dyn CredentialStore>,
        auth: Arc<dyn SessionAuth>,
    ) -> Self {
        AuthSessions {
            profiles,
            credentials,
            auth,
        }
    }

    /// Creates a credential and its linked profile record, returning the new
    /// identity and a session token.
    pub async fn sign_up(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(SessionUser, String)> {
        let full_name = full_name.trim();
        let email = normalize_email(email)?;
        if full_name.is_empty() {
            return Err(AppError::Validation("full name is required".into()));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }

        let user_id = Uuid::now_v7();
        let credential = Credential {
            user_id,
            email: email.clone(),
            password_hash: self.auth.hash_password(password)?,
            created_at: Utc::now(),
        };
        self.credentials.create_credential(&credential).await?;

        let profile = UserProfile {
            id: user_id,
            email: email.clone(),
            full_name: full_name.to_string(),
            created_at: Utc::now(),
        };
        if let Err(err) = self.profiles.create_profile(&profile).await {
            // Best-effort rollback; an orphaned credential would otherwise
            // block the email forever.
            if let Err(rollback) = self.credentials.delete_credential(user_id).await {
                log::warn!("sign-up rollback failed for {user_id}: {rollback}");
            }
            return Err(err);
        }

        let token = self.auth.issue_token(user_id);
        Ok((SessionUser::from(profile), token))
    }

    /// Verifies the password and returns the identity plus a fresh token.
    /// Unknown email and wrong password produce the same message.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(SessionUser, String)> {
        let email = normalize_email(email)?;
        let denied = || AppError::Unauthorized("invalid email or password".into());

        let credential = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or_else(denied)?;
        if !self.auth.verify_password(password, &credential.password_hash) {
            return Err(denied());
        }

        let profile = self
            .profiles
            .get_profile(credential.user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("UserProfile".into(), credential.user_id.to_string())
            })?;

        let token = self.auth.issue_token(credential.user_id);
        Ok((SessionUser::from(profile), token))
    }

    /// Session restoration. Invalid or expired tokens resolve to `None`
    /// rather than an error; only a failing profile read is an error.
    pub async fn resolve_token(&self, token: &str) -> Result<Option<SessionUser>> {
        let Some(user_id) = self.auth.verify_token(token) else {
            return Ok(None);
        };
        Ok(self
            .profiles
            .get_profile(user_id)
            .await?
            .map(SessionUser::from))
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_ascii_lowercase();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::Validation("invalid email address".into()));
    }
    Ok(email)
}
