// Signed envelope codec
// Creates may arrive as `{token}`, an HS256 JWT wrapping the hero to create

//! # Envelope Tokens
//!
//! An envelope is a JWT signed with the server's shared secret. Its claims
//! carry the hero under `hero`:
//!
//! ```json
//! { "hero": { "id": 11, "name": "Encrypted" }, "iat": 1700000000, "exp": 1700000600 }
//! ```
//!
//! `exp` and `nbf` are optional. When present they are enforced with zero
//! leeway. Verification failures are reported with the error names existing
//! clients already parse (`TokenExpiredError`, `NotBeforeError`,
//! `JsonWebTokenError`).

use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::HeroInput;
use crate::{HeroServiceError, Result};

/// Claims carried by an envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeClaims {
    pub hero: HeroInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
}

/// Verifies and issues envelope tokens
pub struct EnvelopeCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl EnvelopeCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Legacy envelopes are often issued without `exp`
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;
        validation.validate_nbf = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return the hero it carries
    pub fn open(&self, token: &str) -> Result<HeroInput> {
        let data = decode::<EnvelopeClaims>(token, &self.decoding_key, &self.validation)
            .map_err(token_error)?;
        Ok(data.claims.hero)
    }

    /// Issue an envelope for `hero`, optionally expiring after `ttl`
    pub fn seal(&self, hero: impl Into<HeroInput>, ttl: Option<Duration>) -> Result<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = EnvelopeClaims {
            hero: hero.into(),
            iat: Some(now),
            exp: ttl.map(|ttl| now.saturating_add(ttl.as_secs())),
            nbf: None,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &EnvelopeClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| HeroServiceError::Internal(format!("Failed to sign envelope: {}", e)))
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec").finish_non_exhaustive()
    }
}

fn token_error(err: JwtError) -> HeroServiceError {
    let (name, message) = match err.kind() {
        ErrorKind::ExpiredSignature => ("TokenExpiredError", "jwt expired".to_string()),
        ErrorKind::ImmatureSignature => ("NotBeforeError", "jwt not active".to_string()),
        ErrorKind::InvalidSignature => ("JsonWebTokenError", "invalid signature".to_string()),
        ErrorKind::InvalidToken => ("JsonWebTokenError", "jwt malformed".to_string()),
        _ => ("JsonWebTokenError", err.to_string()),
    };
    HeroServiceError::TokenVerification {
        name: name.to_string(),
        message,
    }
}
