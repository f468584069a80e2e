//! OAuth flow error types

use std::fmt;

use axum::http::StatusCode;

/// Errors that end the OAuth flow
///
/// Authorization denial is not an error; it is an `AuthorizationResult`.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization code in the request
    MissingCode,

    /// Server-side configuration is incomplete (e.g. client secret unset)
    Configuration(String),

    /// GitHub returned an OAuth error payload or redirected with `error`
    Provider(String),

    /// Token endpoint answered without an access token
    TokenNotIssued,

    /// GitHub answered with a status the flow does not expect
    UnexpectedResponse { endpoint: &'static str, status: u16 },

    /// Identity or membership lookup failed (network, timeout, non-2xx user lookup)
    Verification(String),

    /// Token exchange could not reach GitHub or read its answer
    Network(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCode => write!(f, "No authorization code provided"),
            AuthError::Configuration(msg) => write!(f, "Server configuration error: {}", msg),
            AuthError::Provider(msg) => write!(f, "GitHub OAuth error: {}", msg),
            AuthError::TokenNotIssued => write!(f, "Failed to obtain access token"),
            AuthError::UnexpectedResponse { endpoint, status } => {
                write!(f, "Unexpected response from GitHub {} endpoint: {}", endpoint, status)
            }
            AuthError::Verification(msg) => write!(f, "Access verification failed: {}", msg),
            AuthError::Network(msg) => write!(f, "GitHub request failed: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Get corresponding HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCode => StatusCode::BAD_REQUEST,
            AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Provider(_) => StatusCode::BAD_REQUEST,
            AuthError::TokenNotIssued => StatusCode::BAD_REQUEST,
            AuthError::UnexpectedResponse { .. } => StatusCode::BAD_REQUEST,
            AuthError::Verification(_) => StatusCode::BAD_GATEWAY,
            AuthError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show the caller
    ///
    /// Configuration and transport details stay in the server log.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::MissingCode | AuthError::TokenNotIssued => self.to_string(),
            AuthError::Configuration(_) => "Server configuration error".to_string(),
            AuthError::Provider(msg) => msg.clone(),
            AuthError::UnexpectedResponse { .. } => self.to_string(),
            AuthError::Verification(_) => "Failed to verify repository access".to_string(),
            AuthError::Network(_) => "Failed to reach GitHub".to_string(),
        }
    }
}
