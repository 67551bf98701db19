//! Token cipher trait and the stored-value envelope format.
//!
//! A stored token is either legacy plaintext or the tagged envelope
//! `enc:v1:<base64(nonce || ciphertext)>`. The concrete AES-256-GCM
//! implementation lives in mirrorbot-infra.

use mirrorbot_types::error::VaultError;

/// Prefix tagging an encrypted stored value.
pub const ENVELOPE_PREFIX: &str = "enc:v1:";

/// Whether a stored value is an encrypted envelope rather than a plaintext
/// token. Envelope-prefixed values must never be treated as literal tokens.
pub fn is_envelope(stored: &str) -> bool {
    stored.starts_with(ENVELOPE_PREFIX)
}

/// Per-user symmetric encryption for stored tokens.
///
/// Encryption is opportunistic: with no key configured, values pass through
/// unchanged. Decryption is strict the other way around: an envelope value
/// without a usable key is an error, never a token.
pub trait TokenCipher: Send + Sync {
    /// Whether a shared secret is configured, i.e. whether `encrypt`
    /// actually encrypts.
    fn can_encrypt(&self) -> bool;

    /// Encrypt a token for storage. Returns the plaintext unchanged when no
    /// secret is configured, when the plaintext is empty, or on any
    /// encryption failure -- this method never errors.
    fn encrypt(&self, user_id: i64, plaintext: &str) -> String;

    /// Decrypt a stored value.
    ///
    /// - empty input -> empty output
    /// - non-envelope input -> returned unchanged (plaintext compatibility)
    /// - envelope without a configured secret -> [`VaultError::NoKey`]
    /// - corrupt envelope, wrong key, or tag mismatch -> typed error
    fn decrypt(&self, user_id: i64, stored: &str) -> Result<String, VaultError>;
}
