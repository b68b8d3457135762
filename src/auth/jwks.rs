use std::time::Duration;

use anyhow::Result;
use jsonwebtoken::jwk::JwkSet;

use crate::error::AuthError;

pub const JWKS_UNAVAILABLE: AuthError = AuthError::new(
    "jwks_unavailable",
    "Unable to fetch the signing keys.",
);

/// Fetches the identity provider's published key set.
/// Every call goes to the network; keys are not cached.
#[derive(Debug, Clone)]
pub struct JwksClient {
    http: reqwest::Client,
    url: String,
}

impl JwksClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.into() })
    }

    pub async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(url = %self.url, error = %e, "JWKS request failed");
                JWKS_UNAVAILABLE
            })?;

        resp.json::<JwkSet>().await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "JWKS response is not a key set");
            JWKS_UNAVAILABLE
        })
    }
}
