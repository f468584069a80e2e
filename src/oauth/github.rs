//! GitHub OAuth and REST client
//!
//! Covers the authorize redirect, the code-for-token exchange and the three
//! lookups behind the collaborator gate.

use anyhow::{Result, bail};
use reqwest::{Client, RequestBuilder, StatusCode};

use super::types::{GitHubUser, PermissionResponse, TokenRequest, TokenResponse};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Result of the collaborator membership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    /// 204
    Collaborator,
    /// 404
    NotCollaborator,
    /// Anything else
    Unexpected(u16),
}

/// Result of the permission lookup
#[derive(Debug)]
pub enum PermissionLookup {
    Found(PermissionResponse),
    Unexpected(u16),
}

/// Client for github.com and api.github.com (or a GitHub Enterprise pair)
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    oauth_base_url: String,
    api_base_url: String,
}

impl GitHubClient {
    pub fn new(client: Client, oauth_base_url: &str, api_base_url: &str) -> Self {
        Self {
            client,
            oauth_base_url: oauth_base_url.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the authorize URL the browser is redirected to
    pub fn authorize_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.oauth_base_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(",")),
        )
    }

    /// Exchange an authorization code for a token
    ///
    /// Single attempt. OAuth failures come back inside the returned body.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<TokenResponse> {
        let url = format!("{}/login/oauth/access_token", self.oauth_base_url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&TokenRequest {
                client_id,
                client_secret,
                code,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => Ok(token),
            Err(_) if !status.is_success() => {
                bail!(
                    "Token endpoint returned status {} ({} byte body)",
                    status,
                    body.len()
                )
            }
            Err(e) => bail!("Token endpoint returned an unreadable body: {}", e),
        }
    }

    /// Resolve the login behind a token
    pub async fn fetch_user(&self, token: &str) -> Result<GitHubUser> {
        let url = format!("{}/user", self.api_base_url);
        let response = self.api_get(&url, token).send().await?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch user (status {})", status);
        }

        Ok(response.json().await?)
    }

    /// Check whether `username` is a collaborator on `owner/repo`
    pub async fn check_collaborator(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<MembershipStatus> {
        let url = format!(
            "{}/repos/{}/{}/collaborators/{}",
            self.api_base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            urlencoding::encode(username),
        );
        let response = self.api_get(&url, token).send().await?;

        Ok(match response.status() {
            StatusCode::NO_CONTENT => MembershipStatus::Collaborator,
            StatusCode::NOT_FOUND => MembershipStatus::NotCollaborator,
            other => MembershipStatus::Unexpected(other.as_u16()),
        })
    }

    /// Fetch the permission `username` holds on `owner/repo`
    pub async fn fetch_permission(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<PermissionLookup> {
        let url = format!(
            "{}/repos/{}/{}/collaborators/{}/permission",
            self.api_base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            urlencoding::encode(username),
        );
        let response = self.api_get(&url, token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(PermissionLookup::Unexpected(status.as_u16()));
        }

        Ok(PermissionLookup::Found(response.json().await?))
    }

    fn api_get(&self, url: &str, token: &str) -> RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(token)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}
