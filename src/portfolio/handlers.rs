//! Portfolio API handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use super::compliance::ComplianceReport;
use super::error::PortfolioError;
use super::middleware::PortfolioApiState;
use super::types::{PortfolioState, RetrieveResponse, SaveReceipt, SaveResponse};

/// POST|PUT /api/portfolio
pub async fn save_portfolio(
    State(state): State<PortfolioApiState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, PortfolioError> {
    let data: Value = serde_json::from_slice(&body).map_err(|_| PortfolioError::InvalidPayload)?;
    let date = validate_payload(&data)?;

    let allocations = data["allocations"].as_array().map_or(0, Vec::len);
    let securities = data
        .get("securities")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let stored = state.store.save(date, data).await.map_err(|e| {
        tracing::error!("Portfolio API error: {:#}", e);
        PortfolioError::Storage(e.to_string())
    })?;
    let timestamp = stored.saved_at.to_rfc3339();

    tracing::info!(
        date = %stored.date,
        timestamp = %timestamp,
        allocations,
        securities,
        "Portfolio saved"
    );

    Ok(Json(SaveResponse {
        success: true,
        message: "Portfolio data saved successfully".to_string(),
        data: SaveReceipt {
            date: stored.date,
            timestamp,
        },
    }))
}

/// GET /api/portfolio
pub async fn get_portfolio(State(state): State<PortfolioApiState>) -> Json<RetrieveResponse> {
    let latest = state.store.latest();

    Json(RetrieveResponse {
        success: true,
        message: "Portfolio data retrieved".to_string(),
        saved_at: latest.as_ref().map(|p| p.saved_at.to_rfc3339()),
        data: latest.map(|p| p.data),
    })
}

/// GET /api/portfolio/compliance
pub async fn get_compliance(
    State(state): State<PortfolioApiState>,
) -> Result<Json<ComplianceReport>, PortfolioError> {
    let latest = state.store.latest().ok_or(PortfolioError::NotFound)?;
    let portfolio: PortfolioState = serde_json::from_value(latest.data)
        .map_err(|e| PortfolioError::Malformed(e.to_string()))?;

    let report = ComplianceReport::from_state(&portfolio);
    if !report.securities.is_compliant {
        tracing::debug!(breaches = report.securities.breaches.len(), "Portfolio has IPS breaches");
    }
    Ok(Json(report))
}

/// OPTIONS without a CORS preflight
pub async fn options_ok() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn method_not_allowed() -> PortfolioError {
    PortfolioError::MethodNotAllowed
}

/// Returns the snapshot date when the payload has a date and an allocations array
fn validate_payload(data: &Value) -> Result<String, PortfolioError> {
    let object = data.as_object().ok_or(PortfolioError::InvalidPayload)?;

    let date = match object.get("date") {
        Some(Value::String(date)) if !date.trim().is_empty() => date.clone(),
        _ => return Err(PortfolioError::MissingFields),
    };

    if !object.get("allocations").is_some_and(Value::is_array) {
        return Err(PortfolioError::MissingFields);
    }

    Ok(date)
}
