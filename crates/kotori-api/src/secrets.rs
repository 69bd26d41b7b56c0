//! Secret-store access and the per-process credential cache.
//!
//! Credentials live in an external secret store and are fetched at most once
//! per process lifetime. A fetch failure is not cached: the request that
//! observed it is denied, and the next request retries the store.

use std::sync::Arc;

use async_trait::async_trait;
use kotori_core::{AuthError, ChannelCredentials};
use thiserror::Error;
use tracing::{info, warn};

/// Secret-store failures.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("secret store returned {status} for {name}")]
    Status {
        /// HTTP status code from the store.
        status: u16,
        /// Secret name the fetch targeted.
        name: String,
    },

    /// The entry exists but is not usable as channel credentials.
    #[error("secret {name} is malformed: {reason}")]
    Malformed {
        /// Secret name the fetch targeted.
        name: String,
        /// What made the entry unusable.
        reason: String,
    },
}

/// Read-only secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches and validates the credential entry stored under `name`.
    async fn fetch(&self, name: &str) -> Result<ChannelCredentials, SecretStoreError>;
}

/// HTTP secret store speaking the sidecar protocol: a JSON credential entry
/// served at `GET {base}/secrets/{name}`.
#[derive(Debug, Clone)]
pub struct HttpSecretStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSecretStore {
    /// Creates a store reading from the sidecar at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretStoreError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str) -> Result<Self, SecretStoreError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl SecretStore for HttpSecretStore {
    async fn fetch(&self, name: &str) -> Result<ChannelCredentials, SecretStoreError> {
        let url = format!("{}/secrets/{name}", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SecretStoreError::Status {
                status: status.as_u16(),
                name: name.to_string(),
            });
        }

        let credentials: ChannelCredentials =
            response.json().await.map_err(|e| SecretStoreError::Malformed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        validate(name, &credentials)?;
        Ok(credentials)
    }
}

fn validate(name: &str, credentials: &ChannelCredentials) -> Result<(), SecretStoreError> {
    if credentials.access_token.is_empty() {
        return Err(SecretStoreError::Malformed {
            name: name.to_string(),
            reason: "access token is empty".to_string(),
        });
    }
    if credentials.signing_secret.is_empty() {
        return Err(SecretStoreError::Malformed {
            name: name.to_string(),
            reason: "signing secret is empty".to_string(),
        });
    }
    Ok(())
}

/// Fixed-credential store for tests and local development.
#[derive(Debug, Clone)]
pub struct StaticSecretStore {
    credentials: ChannelCredentials,
}

impl StaticSecretStore {
    /// Creates a store that always returns the given credentials.
    pub fn new(access_token: &str, signing_secret: &str) -> Self {
        Self {
            credentials: ChannelCredentials {
                access_token: access_token.to_string(),
                signing_secret: signing_secret.to_string(),
            },
        }
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn fetch(&self, _name: &str) -> Result<ChannelCredentials, SecretStoreError> {
        Ok(self.credentials.clone())
    }
}

/// Once-per-process credential cache.
///
/// The first request to need credentials drives the fetch; concurrent
/// requests await the same initialization rather than issuing duplicate
/// fetches. A failed fetch leaves the cell empty, so a transient store
/// outage does not poison the process.
pub struct CredentialCache {
    store: Arc<dyn SecretStore>,
    secret_name: String,
    cell: tokio::sync::OnceCell<ChannelCredentials>,
}

impl CredentialCache {
    /// Creates a cold cache over `store`, keyed by `secret_name`.
    pub fn new(store: Arc<dyn SecretStore>, secret_name: &str) -> Self {
        Self { store, secret_name: secret_name.to_string(), cell: tokio::sync::OnceCell::new() }
    }

    /// Returns the cached credentials, fetching on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SecretUnavailable`] when the fetch fails; the
    /// caller denies the request and the cache stays cold.
    pub async fn get(&self) -> Result<&ChannelCredentials, AuthError> {
        let was_warm = self.cell.initialized();
        let credentials = self
            .cell
            .get_or_try_init(|| self.store.fetch(&self.secret_name))
            .await
            .map_err(|error| {
                warn!(secret_name = %self.secret_name, %error, "credential fetch failed");
                AuthError::SecretUnavailable
            })?;
        if !was_warm {
            info!(secret_name = %self.secret_name, "credential cache initialized");
        }
        Ok(credentials)
    }

    /// Whether credentials have been fetched and cached.
    pub fn is_warm(&self) -> bool {
        self.cell.initialized()
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("secret_name", &self.secret_name)
            .field("warm", &self.is_warm())
            .finish()
    }
}
