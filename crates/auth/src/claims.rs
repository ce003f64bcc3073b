//! Local (unverified) inspection of bearer tokens.
//!
//! The client cannot verify signatures; the backend does that on every
//! request. Decoding here only lets a restored session be discarded early when
//! the token has visibly expired or belongs to a different account.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobboard_core::UserId;

/// Claims the backend puts in its JWTs. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Account id the token was issued for (`id`, falling back to `sub`).
    pub fn subject(&self) -> Option<&str> {
        self.id.as_deref().or(self.sub.as_deref())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token subject does not match the stored identity")]
    SubjectMismatch,
}

/// Whether the token has the three-segment JWT shape.
pub fn looks_like_jwt(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && !parts[0].is_empty() && !parts[1].is_empty()
}

/// Decode JWT claims without verifying the signature.
///
/// Returns `Ok(None)` for opaque (non-JWT) tokens.
pub fn decode_unverified(token: &str) -> Result<Option<TokenClaims>, TokenError> {
    if !looks_like_jwt(token) {
        return Ok(None);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| Some(data.claims))
        .map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Deterministically validate the time window of decoded claims.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let Some(expires_at) = claims.expires_at() else {
        return Ok(());
    };
    if let Some(issued_at) = claims.issued_at() {
        if expires_at <= issued_at {
            return Err(TokenError::InvalidTimeWindow);
        }
    }
    if now >= expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

/// Check a persisted token before trusting it again.
///
/// Opaque tokens pass; JWTs must be unexpired and, when they carry a subject,
/// issued for `expected_subject`.
pub fn check_token(
    token: &str,
    expected_subject: Option<&UserId>,
    now: DateTime<Utc>,
) -> Result<(), TokenError> {
    let Some(claims) = decode_unverified(token)? else {
        return Ok(());
    };
    validate_claims(&claims, now)?;

    if let (Some(subject), Some(expected)) = (claims.subject(), expected_subject) {
        if subject != expected.as_str() {
            return Err(TokenError::SubjectMismatch);
        }
    }
    Ok(())
}
