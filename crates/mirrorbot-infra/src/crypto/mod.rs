//! Cryptographic primitives for token storage.

pub mod vault;

pub use vault::TokenVault;
