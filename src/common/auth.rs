//! Shared-key checks for write endpoints

use axum::http::{HeaderMap, header};
use subtle::ConstantTimeEq;

/// Extract the caller's key from request headers
///
/// Supports two forms:
/// - `x-api-key` header
/// - `Authorization: Bearer <token>` header
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(key);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Whether the headers carry `expected`
pub fn has_valid_key(headers: &HeaderMap, expected: &str) -> bool {
    extract_api_key(headers).is_some_and(|key| constant_time_eq(key, expected))
}
