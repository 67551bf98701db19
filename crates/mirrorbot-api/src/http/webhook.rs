//! Telegram webhook endpoint.
//!
//! Telegram only retries a delivery on a non-2xx response, so every handled
//! request answers 200: unusable payloads are acknowledged with "no message"
//! rather than bounced. The one exception is a failed shared-secret check,
//! which answers 401 so a misconfigured (or hostile) caller is visible.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use secrecy::ExposeSecret;

use mirrorbot_types::update::Update;

use crate::state::AppState;

/// Header Telegram echoes the configured webhook secret in.
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Entry point for all requests to `/`.
pub async fn webhook_entry(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    // Browser pokes and Telegram's webhook-set probe both use GET.
    if method != Method::POST {
        return (StatusCode::OK, "Telegram Webhook OK");
    }

    if let Some(secret) = state.config.webhook_secret.as_ref() {
        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !constant_time_eq(secret.expose_secret().as_bytes(), provided.as_bytes()) {
            tracing::warn!("webhook secret mismatch");
            return (StatusCode::UNAUTHORIZED, "unauthorized");
        }
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(err) => {
            tracing::debug!(error = %err, "unparseable update payload");
            return (StatusCode::OK, "no message");
        }
    };
    let has_text = update
        .message
        .as_ref()
        .is_some_and(|m| m.text.is_some());
    if !has_text {
        return (StatusCode::OK, "no message");
    }

    state.dispatcher.handle_update(&update).await;
    (StatusCode::OK, "ok")
}

/// Constant-time byte comparison to prevent timing attacks on the secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
