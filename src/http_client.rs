//! HTTP Client builder module
//!
//! Builds the outbound client shared by every GitHub call, with proxy support

use reqwest::{Client, Proxy};
use std::time::Duration;

use crate::model::config::{Config, TlsBackend};

/// GitHub rejects API requests without a User-Agent
const USER_AGENT: &str = concat!("vertex-rs/", env!("CARGO_PKG_VERSION"));

/// Proxy configuration
#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    /// Proxy URL, supports http/https/socks5
    pub url: String,
    /// Proxy authentication username
    pub username: Option<String>,
    /// Proxy authentication password
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Create proxy configuration from URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Proxy settings from the config file, if a proxy URL is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let url = config.proxy_url.as_deref().filter(|u| !u.trim().is_empty())?;
        let mut proxy = Self::new(url);
        if let (Some(username), Some(password)) = (&config.proxy_username, &config.proxy_password) {
            proxy = proxy.with_auth(username, password);
        }
        Some(proxy)
    }
}

/// Build HTTP Client
///
/// # Arguments
/// * `proxy` - Optional proxy configuration
/// * `timeout_secs` - Timeout in seconds, applied to each request as a whole
///
/// # Returns
/// Configured reqwest::Client
pub fn build_client(
    proxy: Option<&ProxyConfig>,
    timeout_secs: u64,
    tls_backend: TlsBackend,
) -> anyhow::Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT);

    if tls_backend == TlsBackend::Rustls {
        builder = builder.use_rustls_tls();
    }

    if let Some(proxy_config) = proxy {
        let mut proxy = Proxy::all(&proxy_config.url)?;

        // Set proxy authentication
        if let (Some(username), Some(password)) = (&proxy_config.username, &proxy_config.password) {
            proxy = proxy.basic_auth(username, password);
        }

        builder = builder.proxy(proxy);
        tracing::debug!("HTTP Client using proxy: {}", proxy_config.url);
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_with_auth() {
        let config = ProxyConfig::new("socks5://127.0.0.1:1080").with_auth("user", "pass");
        assert_eq!(config.url, "socks5://127.0.0.1:1080");
        assert_eq!(config.username, Some("user".to_string()));
        assert_eq!(config.password, Some("pass".to_string()));
    }

    #[test]
    fn test_proxy_from_config() {
        let mut config = Config::default();
        assert!(ProxyConfig::from_config(&config).is_none());

        config.proxy_url = Some("http://127.0.0.1:7890".to_string());
        let proxy = ProxyConfig::from_config(&config).unwrap();
        assert_eq!(proxy.url, "http://127.0.0.1:7890");
        assert!(proxy.username.is_none());

        config.proxy_username = Some("user".to_string());
        config.proxy_password = Some("pass".to_string());
        let proxy = ProxyConfig::from_config(&config).unwrap();
        assert_eq!(proxy.password, Some("pass".to_string()));
    }

    #[test]
    fn test_blank_proxy_url_is_ignored() {
        let mut config = Config::default();
        config.proxy_url = Some("   ".to_string());
        assert!(ProxyConfig::from_config(&config).is_none());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let config = ProxyConfig::new("http://127.0.0.1:7890");
        let client = build_client(Some(&config), 10, TlsBackend::Rustls);
        assert!(client.is_ok());
    }
}
