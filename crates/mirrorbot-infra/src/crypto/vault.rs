//! AES-256-GCM token vault.
//!
//! Implements [`TokenCipher`] over a shared secret: each user's key is
//! SHA-256 of `"<secret>:<user id>"`, so one leaked per-user key does not
//! expose other users' tokens. Stored form is
//! `enc:v1:<base64(nonce (12 bytes) || ciphertext)>` with a fresh random
//! nonce per encryption.
//!
//! SECURITY: errors never contain plaintext, key material, or ciphertext.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use mirrorbot_core::vault::{ENVELOPE_PREFIX, TokenCipher, is_envelope};
use mirrorbot_types::error::VaultError;

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Shared-secret token vault. Cheap to clone; keys are derived per call.
#[derive(Clone)]
pub struct TokenVault {
    secret: Option<SecretString>,
}

impl TokenVault {
    /// Build a vault from an optional shared secret. `None` (or an empty
    /// secret) yields a passthrough vault that stores tokens in plaintext.
    pub fn new(secret: Option<SecretString>) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        Self { secret }
    }

    fn cipher_for(&self, user_id: i64) -> Option<Aes256Gcm> {
        let secret = self.secret.as_ref()?;
        let material = format!("{}:{user_id}", secret.expose_secret());
        let key: [u8; 32] = Sha256::digest(material.as_bytes()).into();
        Some(Aes256Gcm::new(&key.into()))
    }
}

impl TokenCipher for TokenVault {
    fn can_encrypt(&self) -> bool {
        self.secret.is_some()
    }

    fn encrypt(&self, user_id: i64, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return plaintext.to_string();
        }
        let Some(cipher) = self.cipher_for(user_id) else {
            return plaintext.to_string();
        };

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        match cipher.encrypt(&nonce, plaintext.as_bytes()) {
            Ok(ciphertext) => {
                let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
                payload.extend_from_slice(&nonce);
                payload.extend_from_slice(&ciphertext);
                format!("{ENVELOPE_PREFIX}{}", BASE64.encode(payload))
            }
            // Store plaintext rather than lose the token.
            Err(_) => {
                tracing::warn!(user_id, "token encryption failed, storing plaintext");
                plaintext.to_string()
            }
        }
    }

    fn decrypt(&self, user_id: i64, stored: &str) -> Result<String, VaultError> {
        if stored.is_empty() {
            return Ok(String::new());
        }
        if !is_envelope(stored) {
            return Ok(stored.to_string());
        }
        let Some(cipher) = self.cipher_for(user_id) else {
            return Err(VaultError::NoKey);
        };

        let payload = BASE64
            .decode(&stored[ENVELOPE_PREFIX.len()..])
            .map_err(|_| VaultError::InvalidEnvelope)?;
        if payload.len() < NONCE_SIZE {
            return Err(VaultError::InvalidEnvelope);
        }

        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)?;
        String::from_utf8(plaintext).map_err(|_| VaultError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(secret: &str) -> TokenVault {
        TokenVault::new(Some(SecretString::from(secret)))
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let vault = vault("shared-secret");
        let stored = vault.encrypt(7, "ghp_abc123");

        assert!(is_envelope(&stored));
        assert_ne!(stored, "ghp_abc123");
        assert_eq!(vault.decrypt(7, &stored).unwrap(), "ghp_abc123");
    }

    #[test]
    fn test_no_secret_is_passthrough() {
        let vault = TokenVault::new(None);
        assert!(!vault.can_encrypt());
        assert_eq!(vault.encrypt(7, "ghp_abc"), "ghp_abc");
        assert_eq!(vault.decrypt(7, "ghp_abc").unwrap(), "ghp_abc");
    }

    #[test]
    fn test_empty_secret_is_passthrough() {
        let vault = vault("");
        assert!(!vault.can_encrypt());
        assert_eq!(vault.encrypt(7, "ghp_abc"), "ghp_abc");
    }

    #[test]
    fn test_empty_token_stays_empty() {
        let vault = vault("s");
        assert_eq!(vault.encrypt(7, ""), "");
        assert_eq!(vault.decrypt(7, "").unwrap(), "");
    }

    #[test]
    fn test_plaintext_stored_value_passes_through() {
        let vault = vault("s");
        assert_eq!(vault.decrypt(7, "legacy-plain").unwrap(), "legacy-plain");
    }

    #[test]
    fn test_envelope_without_secret_is_no_key() {
        let with_secret = vault("s");
        let stored = with_secret.encrypt(7, "tok");

        let without_secret = TokenVault::new(None);
        assert!(matches!(
            without_secret.decrypt(7, &stored),
            Err(VaultError::NoKey)
        ));
    }

    #[test]
    fn test_per_user_keys_differ() {
        let vault = vault("shared-secret");
        let stored = vault.encrypt(7, "tok");

        assert!(matches!(
            vault.decrypt(8, &stored),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_different_secrets_cannot_decrypt() {
        let stored = vault("secret-one").encrypt(7, "tok");
        assert!(vault("secret-two").decrypt(7, &stored).is_err());
    }

    #[test]
    fn test_random_nonce_produces_different_envelopes() {
        let vault = vault("s");
        let a = vault.encrypt(7, "same-token");
        let b = vault.encrypt(7, "same-token");
        assert_ne!(a, b);
        assert_eq!(vault.decrypt(7, &a).unwrap(), "same-token");
        assert_eq!(vault.decrypt(7, &b).unwrap(), "same-token");
    }

    #[test]
    fn test_garbage_envelope_is_invalid_not_panic() {
        let vault = vault("s");
        assert!(matches!(
            vault.decrypt(7, "enc:v1:!!!not-base64!!!"),
            Err(VaultError::InvalidEnvelope)
        ));
        assert!(matches!(
            vault.decrypt(7, "enc:v1:AAAA"),
            Err(VaultError::InvalidEnvelope)
        ));
    }

    #[test]
    fn test_tampered_envelope_fails_closed() {
        let vault = vault("s");
        let stored = vault.encrypt(7, "ghp_abc123");

        let payload = &stored[ENVELOPE_PREFIX.len()..];
        let mut bytes = BASE64.decode(payload).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = format!("{ENVELOPE_PREFIX}{}", BASE64.encode(bytes));

        assert!(matches!(
            vault.decrypt(7, &tampered),
            Err(VaultError::DecryptionFailed)
        ));
    }
}
