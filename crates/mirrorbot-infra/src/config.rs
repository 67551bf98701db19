//! Environment-based configuration loading.
//!
//! All runtime configuration comes from environment variables, read once at
//! startup into an immutable [`BotConfig`]. Empty values are treated the same
//! as unset ones.

use std::path::PathBuf;

use secrecy::SecretString;

use mirrorbot_types::config::{BotConfig, CfAccessCredentials};
use mirrorbot_types::error::ConfigError;

/// Load [`BotConfig`] from the process environment.
pub fn from_env() -> Result<BotConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load [`BotConfig`] through an arbitrary variable lookup.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<BotConfig, ConfigError> {
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let bot_token = get("TELEGRAM_BOT_TOKEN")
        .ok_or(ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?;

    let owner_id = match get("OWNER_ID") {
        Some(raw) => Some(raw.parse::<i64>().map_err(|e| ConfigError::InvalidVar {
            name: "OWNER_ID",
            reason: e.to_string(),
        })?),
        None => None,
    };

    // Cloudflare Access credentials only apply as a pair.
    let cf_access = match (get("CF_ACCESS_CLIENT_ID"), get("CF_ACCESS_CLIENT_SECRET")) {
        (Some(client_id), Some(client_secret)) => Some(CfAccessCredentials {
            client_id,
            client_secret: SecretString::from(client_secret),
        }),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("ignoring incomplete Cloudflare Access credentials");
            None
        }
        (None, None) => None,
    };

    let data_dir = get("MIRRORBOT_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
        let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
        PathBuf::from(home).join(".mirrorbot")
    });

    Ok(BotConfig {
        bot_token: SecretString::from(bot_token),
        webhook_secret: get("TELEGRAM_SECRET_TOKEN").map(SecretString::from),
        github_fallback_token: get("GITHUB_TOKEN").map(SecretString::from),
        owner_id,
        required_org: get("GITHUB_AUTH_ORG"),
        gitea_base: get("GITEA_BASE").map(|b| b.trim_end_matches('/').to_string()),
        gitea_token: get("GITEA_TOKEN").map(SecretString::from),
        gitea_username: get("GITEA_USERNAME").unwrap_or_default(),
        vault_secret: get("AES_KEY_SALT").map(SecretString::from),
        cf_access,
        data_dir,
    })
}

/// The SQLite database URL under the configured data directory.
pub fn database_url(config: &BotConfig) -> String {
    format!(
        "sqlite://{}?mode=rwc",
        config.data_dir.join("mirrorbot.db").display()
    )
}
