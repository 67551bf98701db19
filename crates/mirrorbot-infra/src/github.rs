//! GitHub REST API client.

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use mirrorbot_core::clients::GithubApi;
use mirrorbot_types::error::ApiError;
use mirrorbot_types::github::{GithubRepo, GithubUser, MembershipState};

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Repositories fetched per page.
const PAGE_SIZE: u32 = 100;
/// Hard cap on pagination; 2000 repositories is plenty for one account.
const MAX_PAGES: u32 = 20;

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (for tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header(USER_AGENT, "mirrorbot")
            .header(ACCEPT, "application/vnd.github+json");
        if !token.is_empty() {
            req = req.header(AUTHORIZATION, format!("token {token}"));
        }
        req
    }
}

impl GithubApi for GithubClient {
    async fn list_user_repos(&self, user: &str, token: &str) -> Result<Vec<GithubRepo>, ApiError> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let response = self
                .get(&format!("/users/{user}/repos"), token)
                .query(&[
                    ("per_page", PAGE_SIZE.to_string()),
                    ("page", page.to_string()),
                    ("type", "owner".to_string()),
                ])
                .send()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::status(status.as_u16(), body));
            }

            let batch: Vec<GithubRepo> = response
                .json()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            if batch.is_empty() {
                break;
            }
            repos.extend(batch);
        }
        Ok(repos)
    }

    async fn authenticated_user(&self, token: &str) -> Option<GithubUser> {
        let response = self.get("/user", token).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    async fn org_membership(&self, org: &str, token: &str) -> Result<MembershipState, ApiError> {
        let response = self
            .get(&format!("/user/memberships/orgs/{org}"), token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(MembershipState::NotMember);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status.as_u16(), body));
        }

        #[derive(serde::Deserialize)]
        struct Membership {
            state: String,
        }
        let membership: Membership = response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(match membership.state.as_str() {
            "active" => MembershipState::Active,
            "pending" => MembershipState::Pending,
            _ => MembershipState::NotMember,
        })
    }
}
