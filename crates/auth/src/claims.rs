use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use evently_core::ExternalId;

/// Claims carried by a session token.
///
/// Deliberately minimal: the subject is the user's public id and the rest is
/// the validity window. Roles and permissions are never embedded in tokens;
/// they are resolved from the store on every request, so grant changes apply
/// immediately instead of at re-issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject: public identifier of the authenticated user.
    pub sub: ExternalId,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token is malformed or badly signed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Deterministically validate the claims' time window.
///
/// Signature verification happens in [`TokenCodec::decode`]; this checks the
/// *claims* only, against a caller-supplied clock.
pub fn validate_claims(claims: &AuthClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenError::Expired);
    }
    Ok(())
}

/// HS256 signer/verifier for session tokens.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `sub` valid from `now` for `ttl`.
    pub fn issue(
        &self,
        sub: ExternalId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = AuthClaims {
            sub,
            issued_at: now,
            expires_at: now + ttl,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and time window, returning the claims.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, TokenError> {
        // The validity window lives in custom claims, so the library's own
        // exp/iat handling is disabled and validate_claims is the authority.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<AuthClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
