//! GitHub OAuth types

use serde::{Deserialize, Serialize};

/// Provider name reported to the CMS
pub const PROVIDER: &str = "github";

/// Query parameters GitHub appends to the callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    /// Set when the user declines on GitHub
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// POST body carrying the authorization code
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: Option<String>,
}

/// Token endpoint request body
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
}

/// Token endpoint response
///
/// GitHub answers 200 for OAuth failures too, with `error` set instead of a token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /user`
#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// `GET /repos/{owner}/{repo}/collaborators/{user}/permission`
#[derive(Debug, Deserialize)]
pub struct PermissionResponse {
    pub permission: String,
}

/// Collaborator permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollaboratorPermission {
    None,
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl CollaboratorPermission {
    /// Parse the permission string returned by the API
    ///
    /// Accepts both the current names and the legacy `pull`/`push` aliases.
    /// Anything unrecognised is treated as no access.
    pub fn from_api(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "maintain" => Self::Maintain,
            "write" | "push" => Self::Write,
            "triage" => Self::Triage,
            "read" | "pull" => Self::Read,
            _ => Self::None,
        }
    }

    /// Levels that may use the admin panel
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Write | Self::Maintain | Self::Admin)
    }
}

/// Outcome of the access check, produced once per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResult {
    pub authorized: bool,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuthorizationResult {
    pub fn granted(username: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            authorized: true,
            username: username.into(),
            permission: Some(permission.into()),
            reason: None,
        }
    }

    pub fn denied(
        username: impl Into<String>,
        permission: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            authorized: false,
            username: username.into(),
            permission,
            reason: Some(reason.into()),
        }
    }
}

/// Token and access decision for a completed callback
#[derive(Debug)]
pub struct AuthOutcome {
    pub token: String,
    pub result: AuthorizationResult,
}

/// JSON success body
#[derive(Debug, Serialize)]
pub struct AuthSuccessResponse<'a> {
    pub token: &'a str,
    pub provider: &'static str,
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<&'a str>,
}

/// JSON denial body
#[derive(Debug, Serialize)]
pub struct AuthDeniedResponse<'a> {
    pub error: &'a str,
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<&'a str>,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_aliases() {
        assert_eq!(CollaboratorPermission::from_api("push"), CollaboratorPermission::Write);
        assert_eq!(CollaboratorPermission::from_api("write"), CollaboratorPermission::Write);
        assert_eq!(CollaboratorPermission::from_api("pull"), CollaboratorPermission::Read);
        assert_eq!(CollaboratorPermission::from_api("Admin"), CollaboratorPermission::Admin);
        assert_eq!(CollaboratorPermission::from_api("owner"), CollaboratorPermission::None);
    }

    #[test]
    fn test_elevated_allow_list() {
        for level in ["push", "write", "maintain", "admin"] {
            assert!(CollaboratorPermission::from_api(level).is_elevated(), "{level}");
        }
        for level in ["pull", "read", "triage", "none", ""] {
            assert!(!CollaboratorPermission::from_api(level).is_elevated(), "{level}");
        }
    }

    #[test]
    fn test_denied_result_serialization() {
        let result = AuthorizationResult::denied("alice", None, "nope");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["authorized"], false);
        assert_eq!(json["reason"], "nope");
        assert!(json.get("permission").is_none());
    }

    #[test]
    fn test_token_response_ignores_extra_fields() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok1","token_type":"bearer","scope":"repo,user"}"#)
                .unwrap();
        assert_eq!(resp.access_token.as_deref(), Some("tok1"));
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_token_response_with_error_payload() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired.","error_uri":"https://docs.github.com"}"#,
        )
        .unwrap();
        assert!(resp.access_token.is_none());
        assert_eq!(resp.error.as_deref(), Some("bad_verification_code"));
    }
}
