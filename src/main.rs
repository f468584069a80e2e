mod common;
mod http_client;
mod model;
mod oauth;
mod portfolio;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use clap::Parser;
use model::arg::Args;
use model::config::Config;

/// Environment variable holding the GitHub OAuth App client secret
const CLIENT_SECRET_ENV: &str = "DECAP_CMS_GITHUB_APP_SECRET";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {}", e);
        std::process::exit(1);
    });
    if let Some(path) = config.config_path() {
        tracing::debug!("Config file: {}", path.display());
    }

    // GitHub App identity and gated repository
    let app = config.github_app().unwrap_or_else(|e| {
        tracing::error!("{}", e);
        std::process::exit(1);
    });

    // A missing secret is reported per request as a configuration error
    let client_secret = std::env::var(CLIENT_SECRET_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty());
    if client_secret.is_none() {
        tracing::warn!("{} is not set, code exchange will fail", CLIENT_SECRET_ENV);
    }

    // Build proxy configuration
    let proxy_config = http_client::ProxyConfig::from_config(&config);
    if let Some(proxy) = &proxy_config {
        tracing::info!("HTTP proxy configured: {}", proxy.url);
    }

    let repository = format!("{}/{}", app.owner, app.repo);
    let oauth_handler = oauth::OAuthHandler::new(config.clone(), app, client_secret, proxy_config)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to create OAuth handler: {}", e);
            std::process::exit(1);
        });
    let oauth_app = oauth::create_oauth_router(Arc::new(oauth_handler));

    // Portfolio store (memory, or file when configured)
    let store = portfolio::PortfolioStore::from_config(&config).unwrap_or_else(|e| {
        tracing::error!("Failed to open portfolio store: {:#}", e);
        std::process::exit(1);
    });
    match store.path() {
        Some(path) => tracing::info!("Portfolio store: {}", path.display()),
        None => tracing::info!("Portfolio store: memory"),
    }
    let portfolio_state =
        portfolio::PortfolioApiState::new(store, config.portfolio_api_key.clone());
    if portfolio_state.api_key.is_some() {
        tracing::info!("Portfolio writes require an API key");
    }
    let portfolio_app = portfolio::create_portfolio_router(portfolio_state);

    let app = Router::new()
        .nest("/api", oauth_app.merge(portfolio_app))
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes));

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server: {}", addr);
    tracing::info!("Gated repository: {}", repository);
    tracing::info!("Response mode: {:?}", config.response_mode);
    tracing::info!("Available APIs:");
    tracing::info!("  GET  /api/auth");
    tracing::info!("  POST /api/auth");
    tracing::info!("  GET  /api/portfolio");
    tracing::info!("  POST /api/portfolio");
    tracing::info!("  PUT  /api/portfolio");
    tracing::info!("  GET  /api/portfolio/compliance");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
