//! OAuth flow handler
//!
//! Redirect, code exchange and collaborator gate. Each request runs the
//! steps once, in order, with no retries.

use crate::http_client::{ProxyConfig, build_client};
use crate::model::config::{Config, GitHubApp, ResponseMode};

use super::error::AuthError;
use super::github::{GitHubClient, MembershipStatus, PermissionLookup};
use super::types::{AuthOutcome, AuthorizationResult, CollaboratorPermission};

/// Reason given when the membership check answers 404
pub const NOT_COLLABORATOR_REASON: &str = "You are not a collaborator on this repository.";

/// GitHub OAuth handler
pub struct OAuthHandler {
    app: GitHubApp,
    client_secret: Option<String>,
    github: GitHubClient,
    config: Config,
}

impl OAuthHandler {
    pub fn new(
        config: Config,
        app: GitHubApp,
        client_secret: Option<String>,
        proxy: Option<ProxyConfig>,
    ) -> anyhow::Result<Self> {
        let client = build_client(proxy.as_ref(), config.request_timeout_secs, config.tls_backend)?;
        let github = GitHubClient::new(client, &config.oauth_base_url, &config.api_base_url);

        Ok(Self {
            app,
            client_secret: client_secret.filter(|s| !s.trim().is_empty()),
            github,
            config,
        })
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.config.response_mode
    }

    /// Authorize URL for a callback at `redirect_uri`
    pub fn authorize_url(&self, redirect_uri: &str) -> String {
        self.github
            .authorize_url(&self.app.client_id, redirect_uri, &self.config.oauth_scopes)
    }

    /// Callback URL when the request gave no usable origin
    pub fn fallback_callback_url(&self, path: &str) -> String {
        self.config.fallback_callback_url(path)
    }

    /// Exchange `code`, then run the collaborator gate on the issued token
    pub async fn complete(&self, code: &str) -> Result<AuthOutcome, AuthError> {
        let token = self.exchange_code(code).await?;
        let result = self.verify_access(&token).await?;
        Ok(AuthOutcome { token, result })
    }

    /// Exchange an authorization code for an access token
    ///
    /// Fails before any network call when the client secret is missing.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }

        let client_secret = self.client_secret.as_deref().ok_or_else(|| {
            AuthError::Configuration("GitHub client secret is not configured".to_string())
        })?;

        let resp = self
            .github
            .exchange_code(&self.app.client_id, client_secret, code)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if let Some(error) = resp.error {
            tracing::warn!(
                error = %error,
                description = resp.error_description.as_deref().unwrap_or(""),
                "GitHub OAuth error"
            );
            return Err(AuthError::Provider(
                resp.error_description
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| "OAuth authentication failed".to_string()),
            ));
        }

        match resp.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::TokenNotIssued),
        }
    }

    /// Resolve the user behind `token` and decide whether they may edit the repository
    ///
    /// Steps run strictly in order: user, membership, permission.
    pub async fn verify_access(&self, token: &str) -> Result<AuthorizationResult, AuthError> {
        let GitHubApp { owner, repo, .. } = &self.app;

        let user = self
            .github
            .fetch_user(token)
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;
        let username = user.login;

        let membership = self
            .github
            .check_collaborator(token, owner, repo, &username)
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        match membership {
            MembershipStatus::Collaborator => {}
            MembershipStatus::NotCollaborator => {
                return Ok(AuthorizationResult::denied(
                    username,
                    None,
                    NOT_COLLABORATOR_REASON,
                ));
            }
            MembershipStatus::Unexpected(status) => {
                return Err(AuthError::UnexpectedResponse {
                    endpoint: "collaborator",
                    status,
                });
            }
        }

        let lookup = self
            .github
            .fetch_permission(token, owner, repo, &username)
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        let permission = match lookup {
            PermissionLookup::Found(resp) => resp.permission,
            PermissionLookup::Unexpected(status) => {
                return Err(AuthError::UnexpectedResponse {
                    endpoint: "permission",
                    status,
                });
            }
        };

        if CollaboratorPermission::from_api(&permission).is_elevated() {
            Ok(AuthorizationResult::granted(username, permission))
        } else {
            let reason = format!(
                "Insufficient permissions. Your permission level is \"{}\"; write access or higher is required.",
                permission
            );
            Ok(AuthorizationResult::denied(username, Some(permission), reason))
        }
    }
}
