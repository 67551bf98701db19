//! Key-value store trait.
//!
//! Defines the interface for the per-user session storage backend:
//! one string value per stringified Telegram user id.
//! Implementations live in mirrorbot-infra.

use mirrorbot_types::error::RepositoryError;

/// Trait for the persistent key-value session store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get the stored value for a key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Set the value for a key (upsert).
    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a key. No-op if the key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
