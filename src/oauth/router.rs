//! OAuth Router
//!
//! Defines the `/auth` callback used by the CMS popup

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::model::config::ResponseMode;

use super::error::AuthError;
use super::handler::OAuthHandler;
use super::templates;
use super::types::{
    AuthDeniedResponse, AuthOutcome, AuthSuccessResponse, AuthorizationResult, CallbackParams,
    CodeRequest, ErrorBody, PROVIDER,
};

/// OAuth state for handlers
#[derive(Clone)]
pub struct OAuthState {
    pub handler: Arc<OAuthHandler>,
}

/// Create OAuth router
///
/// # Endpoints
/// - `GET /auth` - Redirect to GitHub, or finish the flow when `code` is present
/// - `POST /auth` - Finish the flow with `{ "code": "..." }`
pub fn create_oauth_router(handler: Arc<OAuthHandler>) -> Router {
    let state = OAuthState { handler };

    Router::new()
        .route("/auth", get(handle_callback).post(handle_code))
        .with_state(state)
}

/// Handle GitHub callback (GET /api/auth)
async fn handle_callback(
    State(state): State<OAuthState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let mode = state.handler.response_mode();

    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or_else(|| error.clone());
        tracing::warn!(error = %error, "GitHub authorization was not granted");
        return render_error(mode, &AuthError::Provider(description));
    }

    match params.code.filter(|c| !c.trim().is_empty()) {
        Some(code) => finish(&state, &code).await,
        None => {
            let redirect_uri = callback_url(&state.handler, &headers, uri.path());
            let location = state.handler.authorize_url(&redirect_uri);
            tracing::debug!(redirect_uri = %redirect_uri, "Redirecting to GitHub authorize");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    }
}

/// Handle code submission (POST /api/auth)
async fn handle_code(State(state): State<OAuthState>, body: Bytes) -> Response {
    let code = serde_json::from_slice::<CodeRequest>(&body)
        .ok()
        .and_then(|req| req.code)
        .filter(|c| !c.trim().is_empty());

    match code {
        Some(code) => finish(&state, &code).await,
        None => render_error(state.handler.response_mode(), &AuthError::MissingCode),
    }
}

async fn finish(state: &OAuthState, code: &str) -> Response {
    let mode = state.handler.response_mode();

    match state.handler.complete(code).await {
        Ok(outcome) if outcome.result.authorized => {
            tracing::info!(
                username = %outcome.result.username,
                permission = outcome.result.permission.as_deref().unwrap_or(""),
                "CMS sign-in authorized"
            );
            render_success(mode, &outcome)
        }
        Ok(outcome) => {
            tracing::warn!(
                username = %outcome.result.username,
                permission = outcome.result.permission.as_deref().unwrap_or(""),
                "CMS sign-in denied"
            );
            render_denied(mode, &outcome.result)
        }
        Err(e) => {
            match &e {
                AuthError::Configuration(_) | AuthError::Verification(_) | AuthError::Network(_) => {
                    tracing::error!("OAuth handler error: {}", e)
                }
                _ => tracing::warn!("OAuth handler error: {}", e),
            }
            render_error(mode, &e)
        }
    }
}

/// Callback URL derived from the request's own origin and path
fn callback_url(handler: &OAuthHandler, headers: &HeaderMap, path: &str) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match header_value("x-forwarded-host").or_else(|| header_value(header::HOST.as_str())) {
        Some(host) => {
            let scheme = header_value("x-forwarded-proto").unwrap_or("http");
            format!("{}://{}{}", scheme, host, path)
        }
        None => handler.fallback_callback_url(path),
    }
}

fn render_success(mode: ResponseMode, outcome: &AuthOutcome) -> Response {
    let result = &outcome.result;
    let body = match mode {
        ResponseMode::Json => Json(AuthSuccessResponse {
            token: &outcome.token,
            provider: PROVIDER,
            username: &result.username,
            permission: result.permission.as_deref(),
        })
        .into_response(),
        ResponseMode::Html => {
            Html(templates::render_success_page(
                &outcome.token,
                &result.username,
                result.permission.as_deref(),
            ))
            .into_response()
        }
    };

    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")], body).into_response()
}

fn render_denied(mode: ResponseMode, result: &AuthorizationResult) -> Response {
    let reason = result.reason.as_deref().unwrap_or("Access denied");
    let permission = result.permission.as_deref();

    match mode {
        ResponseMode::Json => (
            StatusCode::FORBIDDEN,
            Json(AuthDeniedResponse {
                error: reason,
                username: &result.username,
                permission,
            }),
        )
            .into_response(),
        ResponseMode::Html => (
            StatusCode::FORBIDDEN,
            Html(templates::render_denied_page(&result.username, permission, reason)),
        )
            .into_response(),
    }
}

fn render_error(mode: ResponseMode, error: &AuthError) -> Response {
    let status = error.status_code();
    let message = error.public_message();

    match mode {
        ResponseMode::Json => (status, Json(ErrorBody { error: message })).into_response(),
        ResponseMode::Html => (status, Html(templates::render_error_page(&message))).into_response(),
    }
}
