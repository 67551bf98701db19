//! HTTP transport: router and webhook handler.

pub mod router;
pub mod webhook;
