//! Infrastructure implementations for Mirrorbot.
//!
//! Concrete backends for the seams declared in `mirrorbot-core`: the SQLite
//! session store, the AES-256-GCM token vault, and reqwest clients for the
//! GitHub, Gitea, and Telegram APIs. Environment-based configuration loading
//! also lives here.

pub mod config;
pub mod crypto;
pub mod gitea;
pub mod github;
pub mod sqlite;
pub mod telegram;
