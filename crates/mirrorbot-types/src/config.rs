//! Immutable service configuration.
//!
//! `BotConfig` is loaded once at startup (from environment variables, see
//! `mirrorbot-infra::config`) and passed into each component at construction.
//! Business logic never performs ambient environment lookups.

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

/// Cloudflare Access service-auth credential pair, attached to every Gitea
/// request when the instance sits behind an Access-protected reverse proxy.
#[derive(Debug, Clone)]
pub struct CfAccessCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Top-level configuration for the Mirrorbot service.
///
/// Secret-bearing fields are wrapped in [`SecretString`] so they never appear
/// in Debug output or tracing logs.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token used to send replies.
    pub bot_token: SecretString,
    /// Optional webhook shared secret; when set, inbound POSTs must carry a
    /// matching `X-Telegram-Bot-Api-Secret-Token` header.
    pub webhook_secret: Option<SecretString>,
    /// Process-wide fallback GitHub token, usable only by the owner.
    pub github_fallback_token: Option<SecretString>,
    /// Distinguished Telegram user id permitted to use the fallback token.
    pub owner_id: Option<i64>,
    /// GitHub organization whose active members may `/login`.
    pub required_org: Option<String>,
    /// Gitea base URL (e.g. `https://git.example.com`).
    pub gitea_base: Option<String>,
    /// Gitea API token.
    pub gitea_token: Option<SecretString>,
    /// Gitea account owning the personal namespace; mirroring into it skips
    /// organization creation.
    pub gitea_username: String,
    /// Shared secret for per-user token encryption. When absent, tokens are
    /// stored in plaintext and envelope values cannot be read back.
    pub vault_secret: Option<SecretString>,
    /// Optional Cloudflare Access credentials for the Gitea reverse proxy.
    pub cf_access: Option<CfAccessCredentials>,
    /// Directory holding the SQLite session database.
    pub data_dir: PathBuf,
}

impl BotConfig {
    /// Whether the given Telegram user id is the configured owner.
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }

    /// The vault shared secret, if one is configured and non-empty.
    pub fn vault_secret(&self) -> Option<&str> {
        self.vault_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
    }
}
