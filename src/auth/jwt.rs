use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::jwks::JwksClient;
use crate::error::AuthError;

pub const MALFORMED: AuthError = AuthError::new("invalid_header", "Authorization malformed.");
pub const UNPARSEABLE: AuthError = AuthError::new(
    "invalid_header",
    "Unable to parse authentication token.",
);
pub const NO_MATCHING_KEY: AuthError = AuthError::new(
    "invalid_header",
    "Unable to find the appropriate key.",
);
pub const EXPIRED: AuthError = AuthError::new("token_expired", "Token expired.");
pub const INVALID_CLAIMS: AuthError = AuthError::new(
    "invalid_claims",
    "Incorrect claims. Please, check the audience and issuer.",
);

/// Claims issued by the identity provider. Only `permissions` drives authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl Claims {
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("unknown")
    }
}

/// Verifies RS256 tokens against the provider's JWKS, issuer and audience.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    jwks: JwksClient,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    pub fn new(jwks: JwksClient, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = key_id(token)?;
        let keys = self.jwks.fetch().await?;
        verify_with_keys(token, &kid, &keys, &self.issuer, &self.audience)
    }
}

/// Reads the `kid` from the token header without verifying anything.
pub fn key_id(token: &str) -> Result<String, AuthError> {
    let header = decode_header(token).map_err(|_| UNPARSEABLE)?;
    header.kid.ok_or(MALFORMED)
}

pub fn verify_with_keys(
    token: &str,
    kid: &str,
    keys: &JwkSet,
    issuer: &str,
    audience: &str,
) -> Result<Claims, AuthError> {
    let jwk = keys.find(kid).ok_or(NO_MATCHING_KEY)?;
    let key = DecodingKey::from_jwk(jwk).map_err(|_| NO_MATCHING_KEY)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => EXPIRED,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => INVALID_CLAIMS,
            _ => UNPARSEABLE,
        })
}
