//! Portfolio API error type definitions

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::PortfolioErrorResponse;

/// Portfolio API errors
#[derive(Debug)]
pub enum PortfolioError {
    /// Body is not a JSON object
    InvalidPayload,

    /// `date` or `allocations` missing
    MissingFields,

    /// Write attempted without the configured key
    Unauthorized,

    /// Nothing stored yet
    NotFound,

    /// Stored snapshot does not fit the typed model
    Malformed(String),

    /// Store write failed
    Storage(String),

    MethodNotAllowed,
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioError::InvalidPayload => write!(f, "Invalid portfolio data"),
            PortfolioError::MissingFields => {
                write!(f, "Portfolio data must include date and allocations array")
            }
            PortfolioError::Unauthorized => write!(f, "Invalid or missing API key"),
            PortfolioError::NotFound => write!(f, "No portfolio data available"),
            PortfolioError::Malformed(msg) => {
                write!(f, "Stored portfolio does not match the expected format: {}", msg)
            }
            PortfolioError::Storage(msg) => write!(f, "Failed to store portfolio: {}", msg),
            PortfolioError::MethodNotAllowed => write!(f, "Method not allowed"),
        }
    }
}

impl std::error::Error for PortfolioError {}

impl PortfolioError {
    /// Get corresponding HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            PortfolioError::InvalidPayload => StatusCode::BAD_REQUEST,
            PortfolioError::MissingFields => StatusCode::BAD_REQUEST,
            PortfolioError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortfolioError::NotFound => StatusCode::NOT_FOUND,
            PortfolioError::Malformed(_) => StatusCode::BAD_REQUEST,
            PortfolioError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortfolioError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn body(&self) -> PortfolioErrorResponse {
        match self {
            PortfolioError::Storage(msg) => PortfolioErrorResponse {
                error: "Internal server error".to_string(),
                message: Some(msg.clone()),
            },
            _ => PortfolioErrorResponse {
                error: self.to_string(),
                message: None,
            },
        }
    }
}

impl IntoResponse for PortfolioError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
