//! Webhook signature authorization.
//!
//! Runs before the dispatcher: the raw body is buffered, the signature
//! header is checked against the HMAC of those exact bytes, and only an
//! allowed request is rebuilt and passed on. Every deny reason produces the
//! same bodyless 401; the distinction lives only in the operator log.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kotori_core::AuthError;
use tracing::{debug, warn};

use crate::crypto;
use crate::secrets::CredentialCache;
use crate::server::AppState;

/// Header carrying the base64 HMAC-SHA256 signature of the request body.
/// Lookup is case-insensitive per HTTP semantics.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Largest body the authorizer will buffer. The platform sends webhook
/// batches far below this; anything bigger is rejected before signature
/// work.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Signature check against the cached channel secret.
pub struct Authorizer {
    cache: std::sync::Arc<CredentialCache>,
}

impl Authorizer {
    /// Creates an authorizer backed by the process credential cache.
    pub fn new(cache: std::sync::Arc<CredentialCache>) -> Self {
        Self { cache }
    }

    /// Decides whether a request carrying `supplied` over `raw_body` may
    /// proceed.
    ///
    /// # Errors
    ///
    /// Fails closed: a missing header, an unavailable secret, and a digest
    /// mismatch each return their [`AuthError`] variant.
    pub async fn authorize(
        &self,
        raw_body: &[u8],
        supplied: Option<&str>,
    ) -> Result<(), AuthError> {
        let supplied = supplied.ok_or(AuthError::MissingSignature)?;
        let credentials = self.cache.get().await?;
        if crypto::verify_signature(raw_body, supplied, &credentials.signing_secret) {
            debug!(body_len = raw_body.len(), "signature verified");
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

/// Axum middleware wrapping [`Authorizer::authorize`].
///
/// Buffers the body, authorizes, and reconstructs the request with the
/// identical bytes so the dispatcher parses exactly what was signed.
pub async fn authorize_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let raw_body = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!("webhook body exceeded size cap or could not be read");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let supplied = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.authorizer.authorize(&raw_body, supplied).await {
        Ok(()) => {
            let request = Request::from_parts(parts, Body::from(raw_body));
            next.run(request).await
        }
        Err(error) => {
            warn!(code = error.code(), %error, "webhook request denied");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::secrets::StaticSecretStore;

    use super::*;

    fn authorizer(secret: &str) -> Authorizer {
        let store = Arc::new(StaticSecretStore::new("tok", secret));
        Authorizer::new(Arc::new(CredentialCache::new(store, "creds")))
    }

    #[tokio::test]
    async fn allows_valid_signature() {
        let auth = authorizer("channel_secret");
        let body = br#"{"events":[]}"#;
        let signature = crypto::sign("channel_secret", body);

        assert!(auth.authorize(body, Some(&signature)).await.is_ok());
    }

    #[tokio::test]
    async fn denies_missing_header() {
        let auth = authorizer("channel_secret");
        let err = auth.authorize(b"{}", None).await.unwrap_err();
        assert_eq!(err, AuthError::MissingSignature);
    }

    #[tokio::test]
    async fn denies_wrong_signature() {
        let auth = authorizer("channel_secret");
        let signature = crypto::sign("other_secret", b"{}");
        let err = auth.authorize(b"{}", Some(&signature)).await.unwrap_err();
        assert_eq!(err, AuthError::SignatureMismatch);
    }

    #[tokio::test]
    async fn denies_garbage_signature() {
        let auth = authorizer("channel_secret");
        let err = auth.authorize(b"{}", Some("not base64 at all")).await.unwrap_err();
        assert_eq!(err, AuthError::SignatureMismatch);
    }
}
