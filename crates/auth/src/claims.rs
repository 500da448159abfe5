use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use libcat_core::{DomainError, UserId};

/// Claims carried by a catalog bearer token.
///
/// The user id travels as a string claim, so it has to be decoded (and may
/// fail to decode) before it can be used against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Stable user identifier (the "name identifier" claim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameidentifier: Option<String>,

    /// Username the token was issued to.
    pub name: String,

    pub iss: String,
    pub aud: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    /// Unique token id.
    pub jti: Uuid,
}

impl JwtClaims {
    /// Decode the name identifier claim into the store's id type.
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        match self.nameidentifier.as_deref() {
            Some(raw) => raw.parse(),
            None => Err(DomainError::invalid_id("nameidentifier claim is missing")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature, issuer and audience are checked by the decoder; this only looks
/// at `iat`/`exp` against the supplied clock.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn claims(iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            nameidentifier: Some("7".to_string()),
            name: "alice".to_string(),
            iss: "libcat".to_string(),
            aud: "libcat-clients".to_string(),
            iat,
            exp,
            jti: Uuid::nil(),
        }
    }

    #[test]
    fn window_is_enforced() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(validate_claims(&claims(900, 1_100), now), Ok(()));
        assert_eq!(validate_claims(&claims(900, 1_000), now), Err(TokenValidationError::Expired));
        assert_eq!(
            validate_claims(&claims(1_001, 1_100), now),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims(1_000, 1_000), now + Duration::seconds(1)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn user_id_decoding_is_fallible() {
        let mut c = claims(0, 10);
        assert_eq!(c.user_id().unwrap(), UserId::new(7));

        c.nameidentifier = Some("not-a-number".to_string());
        assert!(c.user_id().is_err());

        c.nameidentifier = None;
        assert!(c.user_id().is_err());
    }
}
