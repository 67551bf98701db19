//! Business logic and trait definitions for Mirrorbot.
//!
//! This crate defines the "ports" (storage, cipher, and API client traits)
//! that the infrastructure layer implements, plus the command parser, the
//! dispatcher, the session service, and the mirror orchestrator. It depends
//! only on `mirrorbot-types` -- never on `mirrorbot-infra` or any IO crate.

pub mod clients;
pub mod command;
pub mod dispatch;
pub mod mirror;
pub mod session;
pub mod storage;
pub mod vault;
