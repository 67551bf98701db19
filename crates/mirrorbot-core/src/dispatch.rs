//! Update dispatch: one Telegram update in, zero or more chat replies out.
//!
//! The dispatcher is the error boundary for command handling. Every command
//! error is caught here and turned into a `❌` reply; nothing propagates to
//! the webhook layer.

use std::sync::Arc;

use mirrorbot_types::config::BotConfig;
use mirrorbot_types::error::CommandError;
use mirrorbot_types::session::Session;
use mirrorbot_types::update::{Message, Update};

use crate::clients::{ChatApi, GiteaApi, GithubApi};
use crate::command::Command;
use crate::mirror::MirrorService;
use crate::session::SessionService;
use crate::storage::KvStore;
use crate::vault::TokenCipher;

const LOGIN_USAGE: &str = "usage: /login <GitHub personal access token>";

const HELP_TEXT: &str = "commands:\n\
     /mirror <source URL> [dest org/repo] - mirror a repository (or a whole GitHub user)\n\
     /login <GitHub token> - store your GitHub token\n\
     /logout - remove your stored token\n\
     /getid - show chat and user ids";

/// Routes parsed commands to the session and mirror services.
pub struct Dispatcher<K, C, G, E, M> {
    sessions: SessionService<K, C>,
    mirrors: MirrorService<G, E, M>,
    github: G,
    chat: M,
    config: Arc<BotConfig>,
}

impl<K, C, G, E, M> Dispatcher<K, C, G, E, M>
where
    K: KvStore,
    C: TokenCipher,
    G: GithubApi + Clone,
    E: GiteaApi,
    M: ChatApi + Clone,
{
    pub fn new(store: K, cipher: C, github: G, gitea: E, chat: M, config: Arc<BotConfig>) -> Self {
        Self {
            sessions: SessionService::new(store, cipher, config.clone()),
            mirrors: MirrorService::new(github.clone(), gitea, chat.clone(), config.clone()),
            github,
            chat,
            config,
        }
    }

    /// Handle one webhook update. Never fails: command errors become `❌`
    /// replies, and reply delivery failures are only logged.
    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = update.message.as_ref() else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };

        let chat_id = message.chat.id;
        let user_id = message.sender_id();
        tracing::debug!(chat_id, user_id, "handling message");

        if let Err(err) = self.dispatch(chat_id, user_id, message, text).await {
            tracing::warn!(chat_id, user_id, error = %err, "command failed");
            if let Err(send_err) = self
                .chat
                .send_message(chat_id, &format!("❌ error: {err}"))
                .await
            {
                tracing::warn!(chat_id, error = %send_err, "failed to deliver error reply");
            }
        }
    }

    async fn dispatch(
        &self,
        chat_id: i64,
        user_id: i64,
        message: &Message,
        text: &str,
    ) -> Result<(), CommandError> {
        match Command::parse(text) {
            Command::Mirror { source, dest } => {
                self.handle_mirror(chat_id, user_id, source.as_deref(), dest.as_deref())
                    .await
            }
            Command::Login { token } => {
                self.handle_login(chat_id, user_id, message, token.as_deref())
                    .await
            }
            Command::Logout => self.handle_logout(chat_id, user_id).await,
            Command::GetId => self.handle_getid(chat_id, user_id, message).await,
            Command::Help => {
                self.chat.send_message(chat_id, HELP_TEXT).await?;
                Ok(())
            }
        }
    }

    async fn handle_mirror(
        &self,
        chat_id: i64,
        user_id: i64,
        source: Option<&str>,
        dest: Option<&str>,
    ) -> Result<(), CommandError> {
        let Some(source) = source else {
            self.chat
                .send_message(chat_id, MirrorService::<G, E, M>::usage())
                .await?;
            return Ok(());
        };

        let session = self.sessions.load(user_id).await?;
        let Some(token) = self.mirrors.resolve_token(user_id, &session) else {
            self.chat
                .send_message(
                    chat_id,
                    "❌ not authorized: /login <GitHub token> first",
                )
                .await?;
            return Ok(());
        };

        self.mirrors.mirror(chat_id, source, dest, &token).await
    }

    async fn handle_login(
        &self,
        chat_id: i64,
        user_id: i64,
        message: &Message,
        token: Option<&str>,
    ) -> Result<(), CommandError> {
        let Some(token) = token else {
            self.chat.send_message(chat_id, LOGIN_USAGE).await?;
            return Ok(());
        };

        if let Some(org) = self.config.required_org.as_deref() {
            match self.github.org_membership(org, token).await {
                Ok(state) if state.is_active() => {}
                Ok(_) => {
                    self.chat
                        .send_message(
                            chat_id,
                            &format!("❌ cannot log in: not an active member of organization {org}"),
                        )
                        .await?;
                    return Ok(());
                }
                Err(err) => {
                    self.chat
                        .send_message(
                            chat_id,
                            &format!("❌ organization membership check failed: {err}"),
                        )
                        .await?;
                    return Ok(());
                }
            }
        }

        let session = Session {
            github_token: token.to_string(),
            ..Session::default()
        };
        self.sessions.save(user_id, &session).await?;

        let confirmation = match self.config.required_org.as_deref() {
            Some(org) => format!("✅ GitHub login saved (verified via organization {org})"),
            None => "✅ GitHub login saved".to_string(),
        };
        self.chat.send_message(chat_id, &confirmation).await?;

        self.notify_owner_of_login(user_id, message, token).await;
        Ok(())
    }

    /// Tell the configured owner that someone logged in. Strictly
    /// best-effort: any failure is logged and swallowed.
    async fn notify_owner_of_login(&self, user_id: i64, message: &Message, token: &str) {
        let Some(owner_id) = self.config.owner_id else {
            return;
        };
        if owner_id == user_id {
            return;
        }

        let account = match self.github.authenticated_user(token).await {
            Some(user) => match user.name {
                Some(name) => format!("{} ({name})", user.login),
                None => user.login,
            },
            None => "unknown account".to_string(),
        };
        let sender = message
            .sender_display()
            .unwrap_or_else(|| "someone".to_string());
        let text = format!("🔔 {sender} (id {user_id}) logged in with GitHub account {account}");
        if let Err(err) = self.chat.send_message(owner_id, &text).await {
            tracing::debug!(owner_id, error = %err, "owner login notification failed");
        }
    }

    async fn handle_logout(&self, chat_id: i64, user_id: i64) -> Result<(), CommandError> {
        self.sessions.delete(user_id).await?;
        self.chat
            .send_message(chat_id, "✅ logged out, stored GitHub token removed")
            .await?;
        Ok(())
    }

    async fn handle_getid(
        &self,
        chat_id: i64,
        user_id: i64,
        message: &Message,
    ) -> Result<(), CommandError> {
        let chat_kind = message.chat.kind.as_deref().unwrap_or("unknown");
        let sender = message
            .sender_display()
            .unwrap_or_else(|| "there".to_string());
        let text =
            format!("hello {sender}\nyour user id: {user_id}\nthis chat id: {chat_id} ({chat_kind})");
        self.chat.send_message(chat_id, &text).await?;
        Ok(())
    }
}
