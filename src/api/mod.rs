use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::jwks::JwksClient;
use crate::auth::jwt::TokenVerifier;
use crate::config::Config;
use crate::db::DbPool;

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub struct AppState {
    pub db: DbPool,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn from_config(cfg: &Config, db: DbPool) -> Result<Self> {
        let jwks = JwksClient::new(
            cfg.auth.jwks_url(),
            Duration::from_secs(cfg.auth.jwks_timeout_secs),
        )?;
        let verifier = TokenVerifier::new(jwks, cfg.auth.issuer(), cfg.auth.audience.clone());
        Ok(Self { db, verifier })
    }
}

pub async fn serve(cfg: Config, db: DbPool) -> Result<()> {
    let bind_addr = format!("{}:{}", cfg.api.bind, cfg.api.port);
    let state = Arc::new(AppState::from_config(&cfg, db)?);
    tracing::info!(
        issuer = %cfg.auth.issuer(),
        audience = %cfg.auth.audience,
        jwks = %cfg.auth.jwks_url(),
        "Token verification configured"
    );

    let cors = build_cors_layer(&cfg.api.cors_allowed_origins);
    let app = build_app(state, cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured; CORS will block all cross-origin requests");
        return CorsLayer::new();
    }

    base.allow_origin(origins)
}

pub fn build_app(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .merge(router::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
