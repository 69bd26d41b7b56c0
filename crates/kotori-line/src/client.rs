//! Reply and content-fetch API client.
//!
//! [`MessagingApi`] is the seam the dispatcher calls through; [`LineClient`]
//! is the reqwest-backed production implementation with configurable base
//! URLs so tests can point both surfaces at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Platform API errors.
#[derive(Debug, Error)]
pub enum LineApiError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("platform returned {status}: {message}")]
    Status {
        /// HTTP status code from the platform.
        status: u16,
        /// Error message body, truncated.
        message: String,
    },
}

/// Fetched media content with its reported content type.
#[derive(Debug, Clone)]
pub struct MediaContent {
    /// Content type reported by the platform.
    pub content_type: String,
    /// Raw content bytes.
    pub body: Bytes,
}

/// Outbound platform surfaces used by the dispatcher.
///
/// The access token is passed per call rather than held by the client: the
/// token lives in the process-wide credential cache next to the signing
/// secret, and the client itself stays credential-free.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Sends a text reply for the given single-use reply token.
    async fn reply(
        &self,
        access_token: &str,
        reply_token: &str,
        text: &str,
    ) -> Result<(), LineApiError>;

    /// Fetches the binary content of an uploaded media object.
    async fn fetch_content(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> Result<MediaContent, LineApiError>;
}

/// Connection settings for [`LineClient`].
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Base URL of the messaging API (reply endpoint).
    pub api_url: String,
    /// Base URL of the data API (content-fetch endpoint).
    pub data_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.line.me".to_string(),
            data_url: "https://api-data.line.me".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reqwest-backed [`MessagingApi`] implementation.
#[derive(Debug, Clone)]
pub struct LineClient {
    http: reqwest::Client,
    config: LineConfig,
}

#[derive(Debug, Deserialize)]
struct ReplyErrorBody {
    #[serde(default)]
    message: String,
}

impl LineClient {
    /// Creates a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`LineApiError::Transport`] if the HTTP client cannot be
    /// built with the requested settings.
    pub fn new(config: LineConfig) -> Result<Self, LineApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl MessagingApi for LineClient {
    async fn reply(
        &self,
        access_token: &str,
        reply_token: &str,
        text: &str,
    ) -> Result<(), LineApiError> {
        let payload = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": text }],
        });

        let response = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.config.api_url))
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ReplyErrorBody = response.json().await.unwrap_or(ReplyErrorBody {
                message: "unparseable error body".to_string(),
            });
            return Err(LineApiError::Status { status: status.as_u16(), message: body.message });
        }

        debug!(reply_token, "reply sent");
        Ok(())
    }

    async fn fetch_content(
        &self,
        access_token: &str,
        media_id: &str,
    ) -> Result<MediaContent, LineApiError> {
        let response = self
            .http
            .get(format!("{}/v2/bot/message/{media_id}/content", self.config.data_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LineApiError::Status {
                status: status.as_u16(),
                message: format!("content fetch failed for media {media_id}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await?;

        debug!(media_id, size = body.len(), "media content fetched");
        Ok(MediaContent { content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> LineClient {
        LineClient::new(LineConfig {
            api_url: server.uri(),
            data_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reply_posts_token_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(serde_json::json!({
                "replyToken": "T1",
                "messages": [{ "type": "text", "text": "You said: hi" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.reply("tok", "T1", "You said: hi").await.unwrap();
    }

    #[tokio::test]
    async fn reply_surfaces_platform_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "message": "Invalid reply token",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.reply("tok", "expired", "text").await.unwrap_err();
        match err {
            LineApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid reply token");
            },
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_content_returns_bytes_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/bot/message/M1/content"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xff, 0xd8, 0xff]),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let content = client.fetch_content("tok", "M1").await.unwrap();
        assert_eq!(content.content_type, "image/jpeg");
        assert_eq!(content.body.as_ref(), &[0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn fetch_content_failure_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/bot/message/M404/content"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_content("tok", "M404").await.unwrap_err();
        assert!(matches!(err, LineApiError::Status { status: 404, .. }));
    }
}
