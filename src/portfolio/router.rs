//! Portfolio API routing configuration

use axum::{Router, middleware, routing::get};

use super::{
    handlers::{
        get_compliance, get_portfolio, method_not_allowed, options_ok, save_portfolio,
    },
    middleware::{PortfolioApiState, cors_layer, write_auth_middleware},
};

/// Create Portfolio API router
///
/// # Endpoints
/// - `GET /portfolio` - Latest acknowledged snapshot
/// - `POST /portfolio`, `PUT /portfolio` - Validate and store a snapshot
/// - `GET /portfolio/compliance` - IPS compliance report for the latest snapshot
///
/// # Authentication
/// Writes require `portfolioApiKey` when it is configured, via:
/// - `x-api-key` header
/// - `Authorization: Bearer <token>` header
pub fn create_portfolio_router(state: PortfolioApiState) -> Router {
    Router::new()
        .route(
            "/portfolio",
            get(get_portfolio)
                .post(save_portfolio)
                .put(save_portfolio)
                .options(options_ok)
                .fallback(method_not_allowed),
        )
        .route(
            "/portfolio/compliance",
            get(get_compliance)
                .options(options_ok)
                .fallback(method_not_allowed),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            write_auth_middleware,
        ))
        .layer(cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::portfolio::store::PortfolioStore;

    fn app(api_key: Option<&str>) -> Router {
        let state = PortfolioApiState::new(PortfolioStore::in_memory(), api_key.map(str::to_string));
        Router::new().nest("/api", create_portfolio_router(state))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/portfolio")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_save_acknowledges_snapshot() {
        let response = app(None)
            .oneshot(post(r#"{"date":"2025-06-30","allocations":[{"assetClass":"Fixed Income"}],"securities":[]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Portfolio data saved successfully");
        assert_eq!(json["data"]["date"], "2025-06-30");
        assert!(json["data"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_put_is_accepted() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/portfolio")
            .body(Body::from(r#"{"date":"2025-06-30","allocations":[]}"#))
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_bodies() {
        for (body, message) in [
            ("not json", "Invalid portfolio data"),
            ("[]", "Invalid portfolio data"),
            (r#"{"allocations":[]}"#, "Portfolio data must include date and allocations array"),
            (r#"{"date":"2025-06-30"}"#, "Portfolio data must include date and allocations array"),
        ] {
            let response = app(None).oneshot(post(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json_body(response).await["error"], message);
        }
    }

    #[tokio::test]
    async fn test_get_returns_latest_after_save() {
        let app = app(None);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/portfolio").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["message"], "Portfolio data retrieved");
        assert!(json.get("data").is_none());

        app.clone()
            .oneshot(post(r#"{"date":"2025-06-30","allocations":[]}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/portfolio").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["data"]["date"], "2025-06-30");
        assert!(json["savedAt"].is_string());
    }

    #[tokio::test]
    async fn test_compliance_report() {
        let app = app(None);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/portfolio/compliance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let snapshot = json!({
            "date": "2025-06-30",
            "allocations": [
                { "assetClass": "Fixed Income", "target": 60, "current": 64.5, "rebalancingRequired": true }
            ],
            "securities": [
                { "ticker": "CRDB", "assetClass": "Domestic Equities", "sector": "Banking", "currentWeight": 12 }
            ]
        });
        app.clone().oneshot(post(&snapshot.to_string())).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/portfolio/compliance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["allocationsCompliant"], false);
        assert_eq!(json["allocations"][0]["needsRebalancing"], true);
        assert_eq!(json["securities"]["isCompliant"], false);
        assert_eq!(
            json["securities"]["breaches"][0],
            "Single security limit breached: CRDB (12.00%)"
        );
    }

    #[tokio::test]
    async fn test_compliance_with_cleared_fields() {
        let app = app(None);
        let snapshot = json!({
            "date": "2025-06-30",
            "allocations": [
                { "assetClass": "Fixed Income", "target": 60, "targetPercent": 60, "current": null }
            ],
            "securities": [
                { "ticker": "CRDB", "sector": "Banking", "currentWeight": null, "notes": null },
                { "ticker": "NMB", "sector": "Banking", "currentWeight": 8 }
            ]
        });
        app.clone().oneshot(post(&snapshot.to_string())).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/portfolio/compliance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["allocations"][0]["target"], 60.0);
        assert_eq!(json["allocations"][0]["deviation"], -60.0);
        assert_eq!(json["securities"]["isCompliant"], true);
        assert_eq!(json["totalWeight"], 8.0);
    }

    #[tokio::test]
    async fn test_compliance_on_malformed_snapshot() {
        let app = app(None);
        app.clone()
            .oneshot(post(r#"{"date":"2025-06-30","allocations":[{"target":"sixty"}]}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/portfolio/compliance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/portfolio")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/portfolio")
            .header(header::ORIGIN, "https://dashboard.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_plain_options_is_ok() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/portfolio")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_write_key_enforced_when_configured() {
        let app = app(Some("s3cret"));
        let body = r#"{"date":"2025-06-30","allocations":[]}"#;

        let response = app.clone().oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let mut request = post(body);
        request
            .headers_mut()
            .insert("x-api-key", "s3cret".parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/api/portfolio").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
