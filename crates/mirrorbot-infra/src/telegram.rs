//! Telegram Bot API client (outbound messages only; inbound updates arrive
//! over the webhook).

use secrecy::{ExposeSecret, SecretString};

use mirrorbot_core::clients::ChatApi;
use mirrorbot_types::error::ApiError;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretString,
}

impl TelegramClient {
    pub fn new(token: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token,
        }
    }

    /// Override the API base URL (for tests against a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl ChatApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ApiError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.token.expose_secret()
        );
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status.as_u16(), body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_send_message_posts_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/botbot-tok/sendMessage")
                .json_body(serde_json::json!({ "chat_id": 100, "text": "hello" }));
            then.status(200).json_body(serde_json::json!({ "ok": true }));
        });

        let client =
            TelegramClient::new(SecretString::from("bot-tok")).with_api_base(server.base_url());
        client.send_message(100, "hello").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_send_message_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/botbot-tok/sendMessage");
            then.status(429).body("too many requests");
        });

        let client =
            TelegramClient::new(SecretString::from("bot-tok")).with_api_base(server.base_url());
        let err = client.send_message(100, "hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 429, .. }));
    }
}
