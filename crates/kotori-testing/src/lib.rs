//! Test harness for Kotori integration and unit tests.
//!
//! Provides a ready-wired application state over a mock platform server, an
//! in-memory object store, fixture payload builders, and failing
//! collaborator doubles for fault-injection tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use bytes::Bytes;
use kotori_api::middleware::authorize::SIGNATURE_HEADER;
use kotori_api::secrets::{SecretStore, SecretStoreError, StaticSecretStore};
use kotori_api::{create_router, AppState, CredentialCache};
use kotori_core::ChannelCredentials;
use kotori_line::client::{LineClient, LineConfig};
use kotori_store::memory::MemoryObjectStore;
use kotori_store::{ObjectStore, StoreError};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub mod payloads;

/// Access token served by the test secret store.
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";
/// Signing secret served by the test secret store.
pub const TEST_SIGNING_SECRET: &str = "test-channel-secret";

/// Test environment with a mock platform server and in-memory storage.
pub struct TestEnv {
    /// Mock server standing in for both the reply and content APIs.
    pub line: MockServer,
    /// In-memory object store the router writes media into.
    pub store: Arc<MemoryObjectStore>,
    /// Credential cache wired to a static secret store.
    pub credentials: Arc<CredentialCache>,
}

impl TestEnv {
    /// Creates a test environment with working collaborators.
    pub async fn new() -> Self {
        init_tracing();

        let line = MockServer::start().await;
        let store = Arc::new(MemoryObjectStore::new());
        let secret_store =
            Arc::new(StaticSecretStore::new(TEST_ACCESS_TOKEN, TEST_SIGNING_SECRET));
        let credentials = Arc::new(CredentialCache::new(secret_store, "test-credentials"));

        Self { line, store, credentials }
    }

    /// Creates a test environment whose secret store always fails.
    pub async fn with_failing_secret_store() -> Self {
        init_tracing();

        let line = MockServer::start().await;
        let store = Arc::new(MemoryObjectStore::new());
        let credentials =
            Arc::new(CredentialCache::new(Arc::new(FailingSecretStore), "test-credentials"));

        Self { line, store, credentials }
    }

    /// Builds the full application router over this environment.
    pub fn router(&self) -> Router {
        self.router_with_store(self.store.clone())
    }

    /// Builds the router with a custom object store, for fault injection.
    pub fn router_with_store(&self, store: Arc<dyn ObjectStore>) -> Router {
        let messaging = LineClient::new(LineConfig {
            api_url: self.line.uri(),
            data_url: self.line.uri(),
            timeout: Duration::from_secs(5),
        })
        .expect("mock-backed client always builds");

        let state = AppState::new(self.credentials.clone(), Arc::new(messaging), store);
        create_router(state, Duration::from_secs(5))
    }

    /// Signs `body` the way the platform would.
    pub fn sign(&self, body: &[u8]) -> String {
        kotori_api::crypto::sign(TEST_SIGNING_SECRET, body)
    }

    /// Builds a signed webhook request carrying `body`.
    pub fn webhook_request(&self, body: &[u8]) -> Request<Body> {
        let signature = self.sign(body);
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .expect("request builds")
    }

    /// Builds a webhook request with an arbitrary signature header value.
    pub fn webhook_request_with_signature(&self, body: &[u8], signature: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_vec()))
            .expect("request builds")
    }

    /// Builds a webhook request with no signature header at all.
    pub fn webhook_request_unsigned(&self, body: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_vec()))
            .expect("request builds")
    }

    /// Mounts a reply-API mock answering success, expected `expected` times.
    pub async fn mock_reply_ok(&self, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(expected)
            .mount(&self.line)
            .await;
    }

    /// Mounts a reply-API mock that requires the given token and text.
    pub async fn mock_reply_expecting(&self, reply_token: &str, text: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(body_partial_json(serde_json::json!({
                "replyToken": reply_token,
                "messages": [{ "type": "text", "text": text }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(expected)
            .mount(&self.line)
            .await;
    }

    /// Mounts a reply-API mock that always fails with the given status.
    pub async fn mock_reply_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "message": "injected reply failure",
            })))
            .mount(&self.line)
            .await;
    }

    /// Mounts a content-API mock serving `body` for `media_id`.
    pub async fn mock_content(&self, media_id: &str, content_type: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/bot/message/{media_id}/content")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", content_type)
                    .set_body_bytes(body.to_vec()),
            )
            .mount(&self.line)
            .await;
    }

    /// Mounts a content-API mock that fails for every media id.
    pub async fn mock_content_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/v2/bot/message/.+/content$"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.line)
            .await;
    }
}

/// Secret store that fails every fetch, for fail-closed tests.
pub struct FailingSecretStore;

#[async_trait]
impl SecretStore for FailingSecretStore {
    async fn fetch(&self, name: &str) -> Result<ChannelCredentials, SecretStoreError> {
        Err(SecretStoreError::Status { status: 503, name: name.to_string() })
    }
}

/// Object store that fails every write, for partial-failure tests.
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn put(&self, key: &str, _content_type: &str, _body: Bytes) -> Result<(), StoreError> {
        Err(StoreError::Status { status: 503, key: key.to_string() })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,kotori=debug")),
        )
        .with_test_writer()
        .try_init();
}
