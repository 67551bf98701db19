//! Application state wiring all services together.
//!
//! The dispatcher is generic over storage/cipher/client traits; `AppState`
//! pins it to the concrete infra implementations.

use std::sync::Arc;

use secrecy::SecretString;

use mirrorbot_core::dispatch::Dispatcher;
use mirrorbot_infra::config::database_url;
use mirrorbot_infra::crypto::TokenVault;
use mirrorbot_infra::gitea::GiteaClient;
use mirrorbot_infra::github::GithubClient;
use mirrorbot_infra::sqlite::{DatabasePool, SqliteKvStore};
use mirrorbot_infra::telegram::TelegramClient;
use mirrorbot_types::config::BotConfig;

/// Dispatcher pinned to the concrete infra implementations.
pub type ConcreteDispatcher =
    Dispatcher<SqliteKvStore, TokenVault, GithubClient, GiteaClient, TelegramClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BotConfig>,
    pub dispatcher: Arc<ConcreteDispatcher>,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire the
    /// clients and dispatcher.
    pub async fn init(config: BotConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let pool = DatabasePool::new(&database_url(&config)).await?;
        let store = SqliteKvStore::new(pool);
        let vault = TokenVault::new(config.vault_secret.clone());

        let github = GithubClient::new();
        // A missing Gitea config is rejected per command, not at startup, so
        // the bot can still answer /getid and /login when unconfigured.
        let gitea = GiteaClient::new(
            config.gitea_base.clone().unwrap_or_default(),
            config
                .gitea_token
                .clone()
                .unwrap_or_else(|| SecretString::from("")),
            config.cf_access.clone(),
        );
        let telegram = TelegramClient::new(config.bot_token.clone());

        let config = Arc::new(config);
        let dispatcher = Dispatcher::new(store, vault, github, gitea, telegram, config.clone());

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
        })
    }
}
