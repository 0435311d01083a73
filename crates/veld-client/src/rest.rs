//! Thin typed wrapper over the gateway's REST endpoints.
//!
//! All endpoints live under the configured base URL (production:
//! `https://chat-gateway.veld.dev/api/v1`) and authenticate with the
//! session bearer token, which the session client shares after login.
//! Failures carry the status code and body; nothing is retried.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use veld_core::model::{Channel, Embed};

use crate::error::{HttpError, HttpResult, ValidationError};

/// HTTP gateway client.
///
/// Cheap to clone; clones share the HTTP connection pool and the token.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl RestClient {
    /// Creates a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the bearer token used by subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn expect_status(response: Response, expected: StatusCode) -> HttpResult<Response> {
        let status = response.status();
        if status != expected {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "unexpected REST response");
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn post_json(
        &self,
        path: &str,
        body: Option<&Value>,
        expected: StatusCode,
    ) -> HttpResult<Response> {
        let mut request = self.authorize(self.http.post(format!("{}{path}", self.base_url)));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;
        Self::expect_status(response, expected).await
    }

    /// Creates a new channel. `POST /channels`.
    pub async fn create_channel(&self, name: &str) -> HttpResult<Channel> {
        let response = self
            .post_json("/channels", Some(&json!({"name": name})), StatusCode::OK)
            .await?;
        let raw: Value = response
            .json()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))?;
        Channel::decode(&raw).map_err(|e| HttpError::Body(e.to_string()))
    }

    /// Joins a channel. `POST /channels/{id}/join`.
    pub async fn join_channel(&self, channel_id: i64) -> HttpResult<()> {
        self.post_json(
            &format!("/channels/{channel_id}/join"),
            None,
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Sends a message to a channel. `POST /channels/{id}/messages`.
    ///
    /// Exactly one of `content` and `embed` must be supplied; anything else
    /// fails with [`ValidationError`] before any network call.
    pub async fn send_message(
        &self,
        channel_id: i64,
        content: Option<&str>,
        embed: Option<&Embed>,
    ) -> HttpResult<()> {
        let body = message_body(content, embed)?;
        self.post_json(
            &format!("/channels/{channel_id}/messages"),
            Some(&body),
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Sends a message on the legacy single-channel surface. `POST /message`.
    pub async fn send_legacy_message(
        &self,
        content: Option<&str>,
        embed: Option<&Embed>,
    ) -> HttpResult<()> {
        let body = message_body(content, embed)?;
        self.post_json("/message", Some(&body), StatusCode::NO_CONTENT)
            .await?;
        Ok(())
    }
}

/// Builds the outbound message body, enforcing the content/embed arity.
fn message_body(content: Option<&str>, embed: Option<&Embed>) -> Result<Value, ValidationError> {
    match (content, embed) {
        (Some(_), Some(_)) => Err(ValidationError(
            "supply either content or an embed, not both".to_string(),
        )),
        (None, None) => Err(ValidationError(
            "either content or an embed is required".to_string(),
        )),
        (Some(content), None) => Ok(json!({"content": content})),
        (None, Some(embed)) => Ok(json!({"embed": embed.encode()})),
    }
}
