//! Gitea migration API request/response shapes.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/repos/migrate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrateRequest {
    pub clone_addr: String,
    pub repo_name: String,
    pub repo_owner: String,
    pub mirror: bool,
    pub private: bool,
    /// "github" when Gitea should authenticate against GitHub with
    /// `auth_token`, otherwise "git".
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl MigrateRequest {
    /// Build a mirror-mode migration request.
    ///
    /// When the clone address points at github.com and a token is supplied,
    /// the token is passed through so Gitea can authenticate the clone
    /// itself, using the dedicated GitHub migration service.
    pub fn mirror(
        clone_addr: impl Into<String>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
        github_token: Option<&str>,
    ) -> Self {
        let clone_addr = clone_addr.into();
        let from_github = clone_addr
            .to_ascii_lowercase()
            .starts_with("https://github.com/");
        let auth_token = match github_token {
            Some(token) if from_github && !token.is_empty() => Some(token.to_string()),
            _ => None,
        };
        let service = if auth_token.is_some() { "github" } else { "git" };

        Self {
            clone_addr,
            repo_name: repo_name.into(),
            repo_owner: repo_owner.into(),
            mirror: true,
            private: false,
            service: service.to_string(),
            auth_token,
        }
    }
}

/// Outcome of a migration call. Both variants are success: Gitea's
/// conflict statuses (409/422) mean the mirror already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateOutcome {
    Created,
    AlreadyExists,
}
