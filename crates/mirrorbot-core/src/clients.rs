//! Outbound API client traits.
//!
//! Thin seams over the three external HTTP APIs Mirrorbot talks to.
//! Concrete reqwest implementations live in mirrorbot-infra.

use mirrorbot_types::error::ApiError;
use mirrorbot_types::gitea::{MigrateOutcome, MigrateRequest};
use mirrorbot_types::github::{GithubRepo, GithubUser, MembershipState};

/// GitHub REST API operations consumed by Mirrorbot.
pub trait GithubApi: Send + Sync {
    /// List every repository owned by `user`, following pagination
    /// internally (page size 100, hard cap 20 pages).
    fn list_user_repos(
        &self,
        user: &str,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Vec<GithubRepo>, ApiError>> + Send;

    /// Look up the account a token belongs to. Returns None on any failure;
    /// this is only used for best-effort login notifications.
    fn authenticated_user(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Option<GithubUser>> + Send;

    /// The caller's membership state in `org`.
    fn org_membership(
        &self,
        org: &str,
        token: &str,
    ) -> impl std::future::Future<Output = Result<MembershipState, ApiError>> + Send;
}

/// Gitea REST API operations consumed by Mirrorbot.
pub trait GiteaApi: Send + Sync {
    /// Whether an organization with the given name exists.
    fn org_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, ApiError>> + Send;

    /// Create an organization.
    fn create_org(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Request a repository migration. Gitea's conflict statuses (409/422)
    /// map to [`MigrateOutcome::AlreadyExists`], which is success.
    fn migrate_repo(
        &self,
        request: &MigrateRequest,
    ) -> impl std::future::Future<Output = Result<MigrateOutcome, ApiError>> + Send;
}

/// The chat reply channel.
pub trait ChatApi: Send + Sync {
    /// Send a text message to a chat.
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}
