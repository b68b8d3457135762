use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::auth::bearer;
use crate::auth::jwt::Claims;
use crate::error::AppError;

/// Axum extractor that validates a Bearer JWT against the provider's JWKS.
/// Add this as a handler parameter to require authentication.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer::token_from_header_value(parts.headers.get(header::AUTHORIZATION))?;

        let claims = state.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(code = e.code, "token verification failed");
            e
        })?;

        Ok(AuthUser(claims))
    }
}
