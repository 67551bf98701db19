//! Mirror orchestration: source URL classification, destination resolution,
//! organization provisioning, and batch migration with per-repository
//! failure isolation.

use std::sync::Arc;

use secrecy::ExposeSecret;

use mirrorbot_types::config::BotConfig;
use mirrorbot_types::error::CommandError;
use mirrorbot_types::gitea::{MigrateOutcome, MigrateRequest};
use mirrorbot_types::session::Session;

use crate::clients::{ChatApi, GiteaApi, GithubApi};

/// Maximum number of failure reasons enumerated in a batch report.
const MAX_REPORTED_FAILURES: usize = 10;

const MIRROR_USAGE: &str = "usage:\n\
     - /mirror <Git URL> <dest org/repo>\n\
     - /mirror <GitHub URL> [dest org/repo]";

/// How a `/mirror` source URL is interpreted. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorSource {
    /// `https://github.com/<owner>/<repo>[.git][/]`
    GithubRepo { owner: String, repo: String },
    /// `https://github.com/<owner>[/]` -- mirror every repository the
    /// account owns.
    GithubUser { owner: String },
    /// Any other Git URL; requires an explicit destination.
    Raw { url: String },
}

/// Classify a `/mirror` source argument.
pub fn classify_source(src: &str) -> MirrorSource {
    if let Some(rest) = src.strip_prefix("https://github.com/") {
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let mut segments = rest.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), None, _) if !owner.is_empty() => {
                return MirrorSource::GithubUser {
                    owner: owner.to_string(),
                };
            }
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                let name = repo.strip_suffix(".git").filter(|r| !r.is_empty()).unwrap_or(repo);
                return MirrorSource::GithubRepo {
                    owner: owner.to_string(),
                    repo: name.to_string(),
                };
            }
            _ => {}
        }
    }
    MirrorSource::Raw {
        url: src.to_string(),
    }
}

/// Orchestrates mirror requests against Gitea, reporting progress and
/// results over the chat channel. Batch items run strictly sequentially.
pub struct MirrorService<G, E, M> {
    github: G,
    gitea: E,
    chat: M,
    config: Arc<BotConfig>,
}

impl<G: GithubApi, E: GiteaApi, M: ChatApi> MirrorService<G, E, M> {
    pub fn new(github: G, gitea: E, chat: M, config: Arc<BotConfig>) -> Self {
        Self {
            github,
            gitea,
            chat,
            config,
        }
    }

    /// Resolve the GitHub token to mirror with: the caller's stored token
    /// when present, else the process-wide fallback -- owner only.
    pub fn resolve_token(&self, user_id: i64, session: &Session) -> Option<String> {
        if session.is_logged_in() {
            return Some(session.github_token.clone());
        }
        if !self.config.is_owner(user_id) {
            return None;
        }
        self.config
            .github_fallback_token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Run a `/mirror` invocation end to end.
    pub async fn mirror(
        &self,
        chat_id: i64,
        source: &str,
        dest: Option<&str>,
        token: &str,
    ) -> Result<(), CommandError> {
        self.require_gitea()?;

        match classify_source(source) {
            MirrorSource::GithubRepo { owner, repo } => {
                self.mirror_single_github(chat_id, &owner, &repo, dest, token)
                    .await
            }
            MirrorSource::GithubUser { owner } => {
                self.mirror_user_repos(chat_id, &owner, dest, token).await
            }
            MirrorSource::Raw { url } => self.mirror_raw(chat_id, &url, dest, token).await,
        }
    }

    async fn mirror_single_github(
        &self,
        chat_id: i64,
        owner: &str,
        repo: &str,
        dest: Option<&str>,
        token: &str,
    ) -> Result<(), CommandError> {
        let (dst_owner, dst_repo) = match dest {
            Some(dest) => {
                let (o, r) = split_dest(dest);
                (o, r.unwrap_or_else(|| repo.to_string()))
            }
            None => (owner.to_string(), repo.to_string()),
        };

        self.chat
            .send_message(
                chat_id,
                &format!("starting mirror: {owner}/{repo} -> {dst_owner}/{dst_repo}"),
            )
            .await?;

        self.ensure_org(&dst_owner).await?;
        let clone_addr = format!("https://github.com/{owner}/{repo}.git");
        self.migrate(&dst_owner, &dst_repo, &clone_addr, token)
            .await?;

        self.chat
            .send_message(chat_id, &format!("✅ mirror complete: {dst_owner}/{dst_repo}"))
            .await?;
        Ok(())
    }

    async fn mirror_user_repos(
        &self,
        chat_id: i64,
        owner: &str,
        dest: Option<&str>,
        token: &str,
    ) -> Result<(), CommandError> {
        let dst_owner = dest.unwrap_or(owner).to_string();

        self.chat
            .send_message(
                chat_id,
                &format!("starting batch mirror of GitHub user {owner} -> {dst_owner}"),
            )
            .await?;

        self.ensure_org(&dst_owner).await?;
        let repos = self.github.list_user_repos(owner, token).await?;

        // One failing repository must not abort the batch.
        let mut succeeded = 0usize;
        let mut failures: Vec<String> = Vec::new();
        for repo in &repos {
            match self
                .migrate(&dst_owner, &repo.name, &repo.clone_url, token)
                .await
            {
                Ok(()) => succeeded += 1,
                Err(err) => failures.push(format!("{}: {err}", repo.name)),
            }
        }

        let mut report = format!("✅ mirrored {succeeded} repositories");
        if !failures.is_empty() {
            report.push_str(&format!("\n⚠️ {} failed:\n", failures.len()));
            report.push_str(
                &failures
                    .iter()
                    .take(MAX_REPORTED_FAILURES)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        self.chat.send_message(chat_id, &report).await?;
        Ok(())
    }

    async fn mirror_raw(
        &self,
        chat_id: i64,
        url: &str,
        dest: Option<&str>,
        token: &str,
    ) -> Result<(), CommandError> {
        // Non-GitHub sources carry no owner/repo we could infer.
        let Some(dest) = dest else {
            self.chat
                .send_message(
                    chat_id,
                    "❌ non-GitHub sources need an explicit destination: /mirror <Git URL> <dest org/repo>",
                )
                .await?;
            return Ok(());
        };
        let (dst_owner, dst_repo) = split_dest(dest);
        let Some(dst_repo) = dst_repo.filter(|_| !dst_owner.is_empty()) else {
            self.chat
                .send_message(chat_id, "❌ invalid destination, expected owner/repo")
                .await?;
            return Ok(());
        };

        self.chat
            .send_message(
                chat_id,
                &format!("starting mirror: {url} -> {dst_owner}/{dst_repo}"),
            )
            .await?;

        self.ensure_org(&dst_owner).await?;
        self.migrate(&dst_owner, &dst_repo, url, token).await?;

        self.chat
            .send_message(chat_id, &format!("✅ mirror complete: {dst_owner}/{dst_repo}"))
            .await?;
        Ok(())
    }

    /// Make sure the destination owner exists as a Gitea organization.
    /// Mirroring into the configured account's personal namespace skips
    /// the lookup entirely.
    async fn ensure_org(&self, owner: &str) -> Result<(), CommandError> {
        if owner == self.config.gitea_username {
            return Ok(());
        }
        if self.gitea.org_exists(owner).await? {
            return Ok(());
        }
        self.gitea.create_org(owner).await?;
        tracing::info!(org = owner, "created destination organization");
        Ok(())
    }

    async fn migrate(
        &self,
        dst_owner: &str,
        dst_repo: &str,
        clone_addr: &str,
        token: &str,
    ) -> Result<(), CommandError> {
        let request = MigrateRequest::mirror(clone_addr, dst_owner, dst_repo, Some(token));
        match self.gitea.migrate_repo(&request).await? {
            MigrateOutcome::Created => {
                tracing::info!(owner = dst_owner, repo = dst_repo, "mirror created");
            }
            MigrateOutcome::AlreadyExists => {
                tracing::debug!(owner = dst_owner, repo = dst_repo, "mirror already exists");
            }
        }
        Ok(())
    }

    fn require_gitea(&self) -> Result<(), CommandError> {
        let base_ok = self
            .config
            .gitea_base
            .as_deref()
            .is_some_and(|s| !s.is_empty());
        let token_ok = self
            .config
            .gitea_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty());
        if base_ok && token_ok {
            Ok(())
        } else {
            Err(CommandError::Config(
                "GITEA_BASE and GITEA_TOKEN must be set".to_string(),
            ))
        }
    }

    /// Usage text for `/mirror` without arguments.
    pub fn usage() -> &'static str {
        MIRROR_USAGE
    }
}

/// Split a destination argument on the first `/`.
fn split_dest(dest: &str) -> (String, Option<String>) {
    match dest.split_once('/') {
        Some((owner, repo)) if !repo.is_empty() => (owner.to_string(), Some(repo.to_string())),
        Some((owner, _)) => (owner.to_string(), None),
        None => (dest.to_string(), None),
    }
}
