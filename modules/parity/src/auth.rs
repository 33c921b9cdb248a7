//! Bearer token verification and scope checks.
//!
//! Tokens are HS256 JWTs signed with the shared `auth.jwt_secret`. Issuing
//! them is the job of an external identity service.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AuthConfig;
use crate::domain::model::Role;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing bearer token")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token subject does not match any user")]
    UnknownSubject,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Not enough permissions")]
    Forbidden { required: Vec<Role> },

    #[error("Authentication is disabled")]
    Disabled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Claims {
    /// Numeric user id from `sub`.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidToken`] when `sub` is not an integer.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_owned()))
    }

    /// Scopes that name a known role; unknown strings are ignored.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        self.scopes.iter().filter_map(|s| s.parse().ok()).collect()
    }
}

/// Verifies bearer tokens against the configured secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from config; `None` when auth is disabled.
    ///
    /// # Errors
    /// Returns an error when auth is enabled without a signing secret.
    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Option<Self>> {
        if !cfg.enabled {
            return Ok(None);
        }
        let secret = cfg
            .jwt_secret
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("auth.jwt_secret is required when auth is enabled"))?;
        Ok(Some(Self::new(
            secret.expose().as_bytes(),
            cfg.issuer.as_deref(),
            cfg.leeway_seconds,
        )))
    }

    #[must_use]
    pub fn new(secret: &[u8], issuer: Option<&str>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Decode and validate a raw token (without the `Bearer ` prefix).
    ///
    /// # Errors
    /// [`AuthError::TokenExpired`] for an expired token, otherwise
    /// [`AuthError::InvalidToken`] for any signature or claim failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }
}

/// Extract the token from an `Authorization` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Check granted scopes against the required ones; `admin` satisfies all.
///
/// # Errors
/// Returns [`AuthError::Forbidden`] when a required scope is missing.
pub fn authorize(granted: &[Role], required: &[Role]) -> Result<(), AuthError> {
    if granted.contains(&Role::Admin) || required.iter().all(|r| granted.contains(r)) {
        return Ok(());
    }
    Err(AuthError::Forbidden {
        required: required.to_vec(),
    })
}
