//! Per-user session record.

/// The per-user record of stored credential plus resolved Gitea settings.
///
/// Only `github_token` is ever persisted (one string per Telegram user id);
/// the Gitea fields are filled from [`crate::config::BotConfig`] on load.
/// An empty token means the user is not logged in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub github_token: String,
    pub gitea_base: String,
    pub gitea_token: String,
    pub gitea_username: String,
}

impl Session {
    /// Whether the user has a stored GitHub token.
    pub fn is_logged_in(&self) -> bool {
        !self.github_token.is_empty()
    }
}
