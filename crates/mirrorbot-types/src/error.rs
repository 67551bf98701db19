use thiserror::Error;

/// Errors from the token vault.
///
/// These never cross the session-service boundary: an undecryptable stored
/// token degrades to "no token" there. The typed error keeps the distinction
/// between "no value" and "unreadable value" visible for callers and tests.
///
/// IMPORTANT: these errors never include plaintext, key material, or
/// ciphertext in their Display/Debug output.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no vault key configured")]
    NoKey,

    #[error("invalid token envelope")]
    InvalidEnvelope,

    #[error("decryption failed")]
    DecryptionFailed,
}

/// Errors from the key-value session store backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from outbound GitHub / Gitea / Telegram API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl ApiError {
    /// Build a `Status` error from a response status code and body text.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Errors from environment-based configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Errors raised while handling a recognized chat command.
///
/// Caught exactly once at the dispatch boundary and reported back to the
/// originating chat; nothing propagates to the HTTP transport layer.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing configuration: {0}")]
    Config(String),

    #[error("upstream API error: {0}")]
    Upstream(#[from] ApiError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}
