//! GitHub API response shapes consumed by Mirrorbot.

use serde::{Deserialize, Serialize};

/// A repository as returned by the GitHub "list user repositories" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubRepo {
    pub name: String,
    pub clone_url: String,
}

/// The authenticated GitHub account, looked up for login notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// State of an organization membership as reported by GitHub.
///
/// Only `active` passes the login gate; `pending` is rejected identically
/// to non-membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    Active,
    Pending,
    NotMember,
}

impl MembershipState {
    pub fn is_active(self) -> bool {
        matches!(self, MembershipState::Active)
    }
}
