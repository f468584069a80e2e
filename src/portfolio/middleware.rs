//! Portfolio API middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Method, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};

use crate::common::auth;

use super::error::PortfolioError;
use super::store::PortfolioStore;

/// Portfolio API shared state
#[derive(Clone)]
pub struct PortfolioApiState {
    pub store: Arc<PortfolioStore>,
    /// Key required for writes; writes are open when unset
    pub api_key: Option<String>,
}

impl PortfolioApiState {
    pub fn new(store: PortfolioStore, api_key: Option<String>) -> Self {
        Self {
            store: Arc::new(store),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Require the configured key on writes; reads stay open
pub async fn write_auth_middleware(
    State(state): State<PortfolioApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let is_write = matches!(*request.method(), Method::POST | Method::PUT | Method::DELETE);

    match &state.api_key {
        Some(key) if is_write && !auth::has_valid_key(request.headers(), key) => {
            tracing::warn!(method = %request.method(), "Rejected portfolio write without valid key");
            PortfolioError::Unauthorized.into_response()
        }
        _ => next.run(request).await,
    }
}

/// CORS layer for the dashboard and admin panel
///
/// Any origin may call the portfolio API.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
}
