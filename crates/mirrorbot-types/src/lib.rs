//! Shared domain types for Mirrorbot.
//!
//! This crate contains the types used across the Mirrorbot service:
//! per-user sessions, Telegram update shapes, the immutable bot
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, secrecy, thiserror.

pub mod config;
pub mod error;
pub mod github;
pub mod gitea;
pub mod session;
pub mod update;
