//! Credential check + token minting.

use chrono::{DateTime, Utc};
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::password::{self, PasswordError};
use crate::token::{encode_claims, JwtSettings, TokenError};
use crate::{CredentialStore, JwtClaims, StoreError, UserRecord};

/// Username/password pair presented to the issuer.
///
/// Missing fields deserialize as empty strings and fail authentication.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Mints bearer tokens for authenticated users.
pub struct TokenIssuer {
    settings: JwtSettings,
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(settings: JwtSettings) -> Self {
        let key = EncodingKey::from_secret(settings.signing_key.as_bytes());
        Self { settings, key }
    }

    pub fn settings(&self) -> &JwtSettings {
        &self.settings
    }

    /// Build and sign a token for `user`, valid from `now` for the configured
    /// lifetime.
    pub fn mint(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = JwtClaims {
            nameidentifier: Some(user.id.to_string()),
            name: user.username.clone(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat,
            exp: iat + self.settings.lifetime.num_seconds(),
            jti: Uuid::now_v7(),
        };
        encode_claims(&claims, &self.key)
    }

    /// Check `credentials` against the store and mint a token on success.
    ///
    /// Performs exactly one store lookup. Failed attempts are logged with the
    /// attempted username only.
    pub async fn authenticate<S>(
        &self,
        store: &S,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let username = credentials.username.as_str();
        if username.is_empty() || credentials.password.is_empty() {
            tracing::warn!(username, "authentication failed: empty credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = store.find_user_by_username(username).await? else {
            password::verify_against_dummy(&credentials.password);
            tracing::warn!(username, "authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(&credentials.password, &user.password_hash)? {
            tracing::warn!(username, "authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.mint(&user, now)?;
        tracing::info!(username = %user.username, user_id = %user.id, "user authenticated");
        Ok(token)
    }
}
