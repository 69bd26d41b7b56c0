//! Object-storage collaborator.
//!
//! [`ObjectStore`] abstracts a put-object service so the file persister can
//! be tested without network access. The production implementation speaks
//! plain HTTP PUT against an S3-compatible gateway; [`memory::MemoryObjectStore`]
//! is the in-process test double, shipped in-crate the same way the delivery
//! engine ships its mock storage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Object-store failures. Any failure maps to a per-event storage-write
/// handler error upstream.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("object store returned {status} for key {key}")]
    Status {
        /// HTTP status code from the store.
        status: u16,
        /// Object key the write targeted.
        key: String,
    },
}

/// Put-object service.
///
/// Writes are atomic at object granularity; writing the same key twice
/// overwrites, which makes media persistence idempotent under webhook
/// redelivery.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `body` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), StoreError>;
}

/// Derives the deterministic object key for an uploaded media object.
///
/// `media_id` is platform-assigned and unique per upload, so redelivered
/// webhooks land on the same key and overwrite instead of duplicating. The
/// file name is sanitized because it is caller-controlled input.
pub fn object_key(media_id: &str, file_name: &str) -> String {
    format!("media/{media_id}/{}", sanitize_file_name(file_name))
}

/// Strips path separators and other key-hostile characters from a
/// platform-supplied file name.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// HTTP PUT implementation against an S3-compatible gateway.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl HttpObjectStore {
    /// Creates a store writing into `bucket` behind `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, bucket: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), StoreError> {
        let url = format!("{}/{}/{key}", self.endpoint, self.bucket);
        let response = self
            .http
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16(), key: key.to_string() });
        }

        debug!(key, size = body.len(), "object stored");
        Ok(())
    }
}
