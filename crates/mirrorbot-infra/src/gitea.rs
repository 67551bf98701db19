//! Gitea REST API client.
//!
//! All requests carry the service account token. When the instance sits
//! behind Cloudflare Access, the service-token headers are added to every
//! request as well.

use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};

use mirrorbot_core::clients::GiteaApi;
use mirrorbot_types::config::CfAccessCredentials;
use mirrorbot_types::error::ApiError;
use mirrorbot_types::gitea::{MigrateOutcome, MigrateRequest};

#[derive(Clone)]
pub struct GiteaClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
    cf_access: Option<CfAccessCredentials>,
}

impl GiteaClient {
    pub fn new(
        base_url: impl Into<String>,
        token: SecretString,
        cf_access: Option<CfAccessCredentials>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
            cf_access,
        }
    }

    fn headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut req = req.header(
            AUTHORIZATION,
            format!("token {}", self.token.expose_secret()),
        );
        if let Some(cf) = &self.cf_access {
            req = req
                .header("CF-Access-Client-Id", &cf.client_id)
                .header("CF-Access-Client-Secret", cf.client_secret.expose_secret());
        }
        req
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::status(status.as_u16(), body))
    }
}

impl GiteaApi for GiteaClient {
    async fn org_exists(&self, name: &str) -> Result<bool, ApiError> {
        let response = self
            .headers(
                self.http
                    .get(format!("{}/api/v1/orgs/{name}", self.base_url)),
            )
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::status(status.as_u16(), body))
    }

    async fn create_org(&self, name: &str) -> Result<(), ApiError> {
        let response = self
            .headers(self.http.post(format!("{}/api/v1/orgs", self.base_url)))
            .json(&serde_json::json!({ "username": name }))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    async fn migrate_repo(&self, request: &MigrateRequest) -> Result<MigrateOutcome, ApiError> {
        let response = self
            .headers(
                self.http
                    .post(format!("{}/api/v1/repos/migrate", self.base_url)),
            )
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(MigrateOutcome::Created);
        }
        // Gitea answers 409 (repo exists) or 422 (name taken) for an
        // already-mirrored repository.
        if matches!(status.as_u16(), 409 | 422) {
            return Ok(MigrateOutcome::AlreadyExists);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::status(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer, cf_access: Option<CfAccessCredentials>) -> GiteaClient {
        GiteaClient::new(server.base_url(), SecretString::from("gitea-tok"), cf_access)
    }

    #[tokio::test]
    async fn test_org_exists() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/orgs/acme")
                .header("authorization", "token gitea-tok");
            then.status(200).json_body(serde_json::json!({ "username": "acme" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/orgs/ghost");
            then.status(404).body("not found");
        });

        let client = client(&server, None);
        assert!(client.org_exists("acme").await.unwrap());
        assert!(!client.org_exists("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_org_posts_username() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/orgs")
                .json_body(serde_json::json!({ "username": "acme" }));
            then.status(201).json_body(serde_json::json!({ "username": "acme" }));
        });

        client(&server, None).create_org("acme").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_migrate_created() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/repos/migrate");
            then.status(201).json_body(serde_json::json!({ "name": "widget" }));
        });

        let request = MigrateRequest::mirror(
            "https://github.com/acme/widget.git",
            "acme",
            "widget",
            Some("gh-tok"),
        );
        let outcome = client(&server, None).migrate_repo(&request).await.unwrap();
        assert!(matches!(outcome, MigrateOutcome::Created));
    }

    #[tokio::test]
    async fn test_migrate_conflict_is_already_exists() {
        let server = MockServer::start();
        for status in [409u16, 422] {
            server.mock(|when, then| {
                when.method(POST).path("/api/v1/repos/migrate");
                then.status(status).body("already exists");
            });

            let request = MigrateRequest::mirror(
                "https://github.com/acme/widget.git",
                "acme",
                "widget",
                None,
            );
            let outcome = client(&server, None).migrate_repo(&request).await.unwrap();
            assert!(matches!(outcome, MigrateOutcome::AlreadyExists));
        }
    }

    #[tokio::test]
    async fn test_migrate_server_error_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/repos/migrate");
            then.status(500).body("boom");
        });

        let request =
            MigrateRequest::mirror("https://github.com/acme/widget.git", "acme", "widget", None);
        let err = client(&server, None).migrate_repo(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_cf_access_headers_on_every_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/orgs/acme")
                .header("cf-access-client-id", "cf-id")
                .header("cf-access-client-secret", "cf-secret");
            then.status(200).json_body(serde_json::json!({ "username": "acme" }));
        });

        let cf = CfAccessCredentials {
            client_id: "cf-id".to_string(),
            client_secret: SecretString::from("cf-secret"),
        };
        assert!(client(&server, Some(cf)).org_exists("acme").await.unwrap());
        mock.assert();
    }
}
