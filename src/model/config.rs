use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    Rustls,
    NativeTls,
}

impl Default for TlsBackend {
    fn default() -> Self {
        Self::Rustls
    }
}

/// How the `/auth` handler answers once the flow completes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// `{ token, provider }` / `{ error }` JSON bodies
    #[default]
    Json,
    /// HTML page that hands the token to the opener window
    Html,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// GitHub OAuth App client ID
    #[serde(default)]
    pub github_client_id: Option<String>,

    /// Owner of the repository whose collaborators may sign in
    #[serde(default)]
    pub repo_owner: Option<String>,

    /// Name of the repository whose collaborators may sign in
    #[serde(default)]
    pub repo_name: Option<String>,

    /// OAuth scopes requested on the authorize redirect
    #[serde(default = "default_oauth_scopes")]
    pub oauth_scopes: Vec<String>,

    /// Callback URL used when the request carries no Host header
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Base URL of the GitHub web host (authorize and token endpoints)
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub response_mode: ResponseMode,

    /// Timeout applied to every outbound GitHub call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_tls_backend")]
    pub tls_backend: TlsBackend,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Proxy authentication username (optional)
    #[serde(default)]
    pub proxy_username: Option<String>,

    /// Proxy authentication password (optional)
    #[serde(default)]
    pub proxy_password: Option<String>,

    /// File the latest portfolio snapshot is written to (optional, memory only if unset)
    #[serde(default)]
    pub portfolio_store_path: Option<String>,

    /// Key required for portfolio writes (optional, writes are open if unset)
    #[serde(default)]
    pub portfolio_api_key: Option<String>,

    /// Maximum request body size in bytes (default: 1000000)
    #[serde(default = "default_max_request_body_bytes")]
    pub max_request_body_bytes: usize,

    /// Config file path (runtime metadata, not written to JSON)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_oauth_scopes() -> Vec<String> {
    vec!["repo".to_string(), "user".to_string()]
}

fn default_oauth_base_url() -> String {
    "https://github.com".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_tls_backend() -> TlsBackend {
    TlsBackend::Rustls
}

fn default_max_request_body_bytes() -> usize {
    1_000_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            github_client_id: None,
            repo_owner: None,
            repo_name: None,
            oauth_scopes: default_oauth_scopes(),
            callback_url: None,
            oauth_base_url: default_oauth_base_url(),
            api_base_url: default_api_base_url(),
            response_mode: ResponseMode::default(),
            request_timeout_secs: default_request_timeout_secs(),
            tls_backend: default_tls_backend(),
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
            portfolio_store_path: None,
            portfolio_api_key: None,
            max_request_body_bytes: default_max_request_body_bytes(),
            config_path: None,
        }
    }
}

/// Resolved GitHub App settings, loaded once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubApp {
    pub client_id: String,
    pub owner: String,
    pub repo: String,
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Resolve the GitHub App identity and the gated repository
    ///
    /// Empty strings are treated as not configured.
    pub fn github_app(&self) -> anyhow::Result<GitHubApp> {
        fn required(value: &Option<String>, key: &str) -> anyhow::Result<String> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => bail!("{} not set in config file", key),
            }
        }

        Ok(GitHubApp {
            client_id: required(&self.github_client_id, "githubClientId")?,
            owner: required(&self.repo_owner, "repoOwner")?,
            repo: required(&self.repo_name, "repoName")?,
        })
    }

    /// Callback used when the request carries no usable Host header
    pub fn fallback_callback_url(&self, path: &str) -> String {
        match &self.callback_url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("http://{}:{}{}", self.host, self.port, path),
        }
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // Config file doesn't exist, return default config
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get config file path (if available)
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.oauth_scopes, vec!["repo", "user"]);
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert_eq!(config.response_mode, ResponseMode::Json);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_parse_camel_case_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "githubClientId": "Iv1.abc",
                "repoOwner": "vertex",
                "repoName": "portfolio",
                "responseMode": "html",
                "requestTimeoutSecs": 3
            }"#,
        )
        .unwrap();

        assert_eq!(config.response_mode, ResponseMode::Html);
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(
            config.github_app().unwrap(),
            GitHubApp {
                client_id: "Iv1.abc".to_string(),
                owner: "vertex".to_string(),
                repo: "portfolio".to_string(),
            }
        );
    }

    #[test]
    fn test_github_app_rejects_blank_values() {
        let mut config = Config::default();
        config.github_client_id = Some("Iv1.abc".to_string());
        config.repo_owner = Some("  ".to_string());
        config.repo_name = Some("portfolio".to_string());

        let err = config.github_app().unwrap_err();
        assert!(err.to_string().contains("repoOwner"));
    }

    #[test]
    fn test_fallback_callback_url() {
        let mut config = Config::default();
        assert_eq!(
            config.fallback_callback_url("/api/auth"),
            "http://127.0.0.1:8080/api/auth"
        );

        config.callback_url = Some("https://vertex.example/api/auth".to_string());
        assert_eq!(
            config.fallback_callback_url("/api/auth"),
            "https://vertex.example/api/auth"
        );
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.config_path(), Some(path.as_path()));
    }
}
