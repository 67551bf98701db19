//! Per-user session load/save/delete over the KV store and token cipher.
//!
//! Only the GitHub token is persisted (one string per user id). Gitea
//! settings are filled from configuration on every load. Legacy plaintext
//! values are transparently upgraded to the encrypted envelope form on read.

use std::sync::Arc;

use secrecy::ExposeSecret;

use mirrorbot_types::config::BotConfig;
use mirrorbot_types::error::RepositoryError;
use mirrorbot_types::session::Session;

use crate::storage::KvStore;
use crate::vault::{TokenCipher, is_envelope};

/// Session persistence service, generic over the storage backend and the
/// token cipher (concrete implementations live in mirrorbot-infra).
pub struct SessionService<K, C> {
    store: K,
    cipher: C,
    config: Arc<BotConfig>,
}

impl<K: KvStore, C: TokenCipher> SessionService<K, C> {
    pub fn new(store: K, cipher: C, config: Arc<BotConfig>) -> Self {
        Self {
            store,
            cipher,
            config,
        }
    }

    /// Load the session for a user.
    ///
    /// Never fails for "no session": a missing row yields a logged-out
    /// session. An unreadable stored token (wrong key, corrupt envelope,
    /// envelope with no key configured) also degrades to logged-out -- the
    /// user simply has to `/login` again.
    pub async fn load(&self, user_id: i64) -> Result<Session, RepositoryError> {
        let key = user_id.to_string();
        let raw = self.store.get(&key).await?;

        let token = match raw.as_deref() {
            None => String::new(),
            Some(stored) => match self.cipher.decrypt(user_id, stored) {
                Ok(token) => token,
                Err(err) => {
                    tracing::debug!(user_id, error = %err, "stored token unreadable, treating as logged out");
                    String::new()
                }
            },
        };

        // Upgrade legacy plaintext rows to the envelope form, best-effort.
        // A failed rewrite must not break the read path.
        if let Some(stored) = raw.as_deref() {
            if !is_envelope(stored) && self.cipher.can_encrypt() && !token.is_empty() {
                let envelope = self.cipher.encrypt(user_id, &token);
                if envelope != stored {
                    if let Err(err) = self.store.put(&key, &envelope).await {
                        tracing::warn!(user_id, error = %err, "plaintext token migration failed");
                    }
                }
            }
        }

        Ok(Session {
            github_token: token,
            gitea_base: self.config.gitea_base.clone().unwrap_or_default(),
            gitea_token: self
                .config
                .gitea_token
                .as_ref()
                .map(|t| t.expose_secret().to_string())
                .unwrap_or_default(),
            gitea_username: self.config.gitea_username.clone(),
        })
    }

    /// Persist the session's GitHub token (the only persisted field).
    pub async fn save(&self, user_id: i64, session: &Session) -> Result<(), RepositoryError> {
        let stored = self.cipher.encrypt(user_id, &session.github_token);
        self.store.put(&user_id.to_string(), &stored).await
    }

    /// Remove the stored session entirely (logout).
    pub async fn delete(&self, user_id: i64) -> Result<(), RepositoryError> {
        self.store.delete(&user_id.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::ENVELOPE_PREFIX;
    use mirrorbot_types::error::VaultError;
    use secrecy::SecretString;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory KV store; `fail_puts` simulates a read-only backend.
    #[derive(Default)]
    struct MemKv {
        entries: Mutex<HashMap<String, String>>,
        fail_puts: bool,
    }

    impl KvStore for &MemKv {
        async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
            if self.fail_puts {
                return Err(RepositoryError::Query("read-only".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    /// Reversing "cipher" honoring the TokenCipher contract, good enough to
    /// observe envelope handling without real crypto.
    struct MockCipher {
        has_secret: bool,
    }

    impl TokenCipher for MockCipher {
        fn can_encrypt(&self) -> bool {
            self.has_secret
        }

        fn encrypt(&self, _user_id: i64, plaintext: &str) -> String {
            if !self.has_secret || plaintext.is_empty() {
                return plaintext.to_string();
            }
            let reversed: String = plaintext.chars().rev().collect();
            format!("{ENVELOPE_PREFIX}{reversed}")
        }

        fn decrypt(&self, _user_id: i64, stored: &str) -> Result<String, VaultError> {
            if stored.is_empty() {
                return Ok(String::new());
            }
            if !is_envelope(stored) {
                return Ok(stored.to_string());
            }
            if !self.has_secret {
                return Err(VaultError::NoKey);
            }
            Ok(stored[ENVELOPE_PREFIX.len()..].chars().rev().collect())
        }
    }

    fn test_config() -> Arc<BotConfig> {
        Arc::new(BotConfig {
            bot_token: SecretString::from("bot"),
            webhook_secret: None,
            github_fallback_token: None,
            owner_id: None,
            required_org: None,
            gitea_base: Some("https://git.example.com".to_string()),
            gitea_token: Some(SecretString::from("gitea-tok")),
            gitea_username: "mirror".to_string(),
            vault_secret: Some(SecretString::from("salt")),
            cf_access: None,
            data_dir: PathBuf::from("/tmp"),
        })
    }

    #[tokio::test]
    async fn test_load_missing_row_is_logged_out() {
        let kv = MemKv::default();
        let service = SessionService::new(&kv, MockCipher { has_secret: true }, test_config());

        let session = service.load(1).await.unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session.gitea_base, "https://git.example.com");
        assert_eq!(session.gitea_token, "gitea-tok");
        assert_eq!(session.gitea_username, "mirror");
    }

    #[tokio::test]
    async fn test_load_plaintext_migrates_to_envelope() {
        let kv = MemKv::default();
        kv.entries
            .lock()
            .unwrap()
            .insert("1".to_string(), "ghp_plain".to_string());
        let service = SessionService::new(&kv, MockCipher { has_secret: true }, test_config());

        let session = service.load(1).await.unwrap();
        assert_eq!(session.github_token, "ghp_plain");

        let stored = kv.entries.lock().unwrap().get("1").cloned().unwrap();
        assert!(is_envelope(&stored), "plaintext row should be upgraded");
    }

    #[tokio::test]
    async fn test_load_plaintext_without_secret_left_alone() {
        let kv = MemKv::default();
        kv.entries
            .lock()
            .unwrap()
            .insert("1".to_string(), "ghp_plain".to_string());
        let service = SessionService::new(&kv, MockCipher { has_secret: false }, test_config());

        let session = service.load(1).await.unwrap();
        assert_eq!(session.github_token, "ghp_plain");
        assert_eq!(
            kv.entries.lock().unwrap().get("1").map(String::as_str),
            Some("ghp_plain")
        );
    }

    #[tokio::test]
    async fn test_load_envelope_without_secret_is_logged_out() {
        let kv = MemKv::default();
        kv.entries
            .lock()
            .unwrap()
            .insert("1".to_string(), format!("{ENVELOPE_PREFIX}xyz"));
        let service = SessionService::new(&kv, MockCipher { has_secret: false }, test_config());

        let session = service.load(1).await.unwrap();
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_migration_write_failure_does_not_break_read() {
        let kv = MemKv {
            fail_puts: true,
            ..MemKv::default()
        };
        kv.entries
            .lock()
            .unwrap()
            .insert("1".to_string(), "ghp_plain".to_string());
        let service = SessionService::new(&kv, MockCipher { has_secret: true }, test_config());

        let session = service.load(1).await.unwrap();
        assert_eq!(session.github_token, "ghp_plain");
    }

    #[tokio::test]
    async fn test_save_encrypts_and_load_roundtrips() {
        let kv = MemKv::default();
        let service = SessionService::new(&kv, MockCipher { has_secret: true }, test_config());

        let session = Session {
            github_token: "ghp_secret".to_string(),
            ..Session::default()
        };
        service.save(7, &session).await.unwrap();

        let stored = kv.entries.lock().unwrap().get("7").cloned().unwrap();
        assert!(is_envelope(&stored));
        assert_ne!(stored, "ghp_secret");

        let loaded = service.load(7).await.unwrap();
        assert_eq!(loaded.github_token, "ghp_secret");
    }

    #[tokio::test]
    async fn test_delete_logs_out() {
        let kv = MemKv::default();
        let service = SessionService::new(&kv, MockCipher { has_secret: true }, test_config());

        let session = Session {
            github_token: "tok".to_string(),
            ..Session::default()
        };
        service.save(7, &session).await.unwrap();
        service.delete(7).await.unwrap();

        assert!(!service.load(7).await.unwrap().is_logged_in());
    }
}
