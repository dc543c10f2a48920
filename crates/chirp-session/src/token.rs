//! Local bearer token decoding
//!
//! The token is a JWT: `header.payload.signature`, with the payload a
//! base64url JSON object. Only the claims are read; the signature is the
//! server's business.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;

use crate::error::TokenError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// User id as issued by the Chirp API.
    #[serde(default)]
    pub id: Option<String>,
    /// Standard JWT subject.
    #[serde(default)]
    pub sub: Option<String>,
    /// Issued-at, seconds since the epoch.
    #[serde(default)]
    pub iat: Option<f64>,
    /// Expiry, seconds since the epoch; may be fractional.
    #[serde(default)]
    pub exp: Option<f64>,
}

impl Claims {
    /// The user the token was issued for.
    pub fn subject(&self) -> Option<&str> {
        self.id.as_deref().or(self.sub.as_deref())
    }
}

#[derive(Clone, PartialEq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    pub fn decode(raw: &str) -> Result<Self, TokenError> {
        let raw = raw.trim();
        let mut parts = raw.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let bytes = decode_segment(payload)
            .ok_or_else(|| TokenError::Malformed("payload is not base64url".to_string()))?;
        let claims = serde_json::from_slice::<Claims>(&bytes)
            .map_err(|e| TokenError::Malformed(format!("invalid claims: {e}")))?;

        Ok(Self {
            raw: raw.to_string(),
            claims,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Expiry as a timestamp. `None` when the token carries no `exp` claim
    /// or the claim lies outside the representable range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.exp?;
        Utc.timestamp_millis_opt((exp * 1000.0) as i64).single()
    }

    /// Compared numerically, so an out-of-range `exp` in the past still
    /// counts. Tokens without `exp` never expire locally; a token whose
    /// expiry equals `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp_millis() as f64 / 1000.0;
        self.claims.exp.is_some_and(|exp| exp <= now)
    }

    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if !self.is_expired_at(now) {
            return Ok(());
        }
        let expired_at = self.expires_at().unwrap_or(DateTime::<Utc>::MIN_UTC);
        Err(TokenError::Expired { expired_at })
    }

    /// Decode and check expiry against the current time.
    pub fn decode_valid(raw: &str) -> Result<Self, TokenError> {
        let token = Self::decode(raw)?;
        token.validate_at(Utc::now())?;
        Ok(token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| general_purpose::URL_SAFE.decode(segment))
        .ok()
}
