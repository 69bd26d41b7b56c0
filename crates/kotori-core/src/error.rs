//! Error taxonomy for the webhook pipeline.
//!
//! Three disjoint groups with stable codes for operator diagnostics:
//! authorization errors (always fail closed, request never reaches the
//! dispatcher), payload errors (client error after successful authorization),
//! and handler errors (isolated per event, never abort sibling events and
//! never surface in the HTTP status).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization failures.
///
/// Every variant is reported to the external caller as an identical bodyless
/// 401 so that a probing client learns nothing about which check failed. The
/// variant itself is logged for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The secret store was unreachable or the entry was malformed (A1001).
    #[error("[A1001] credentials unavailable from secret store")]
    SecretUnavailable,

    /// The supplied signature does not match the computed digest (A1002).
    #[error("[A1002] signature mismatch")]
    SignatureMismatch,

    /// The signature header is absent from the request (A1003).
    #[error("[A1003] signature header missing")]
    MissingSignature,
}

impl AuthError {
    /// Returns the stable error code (A1001-A1003).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SecretUnavailable => "A1001",
            Self::SignatureMismatch => "A1002",
            Self::MissingSignature => "A1003",
        }
    }
}

/// Payload failures after successful authorization.
///
/// Distinct from [`AuthError`]: the signature was valid, but the body could
/// not be interpreted (truncated transport, non-JSON content). Surfaced to
/// the caller as a 400.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The verified body could not be parsed into message events (P1001).
    #[error("[P1001] malformed body: {0}")]
    MalformedBody(String),
}

impl PayloadError {
    /// Returns the stable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "P1001",
        }
    }
}

/// Per-event handler failures.
///
/// Recorded in the dispatch summary and logged, but deliberately never
/// reflected in the HTTP status: the messaging platform retries non-2xx
/// responses, and reply tokens are single-use, so a retry can never succeed.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The reply API rejected or failed the call (H1001).
    #[error("[H1001] reply API error: {0}")]
    ReplyApi(String),

    /// Media content could not be fetched for a file event (H1002).
    #[error("[H1002] media fetch error: {0}")]
    MediaFetch(String),

    /// The object store rejected or failed the write (H1003).
    #[error("[H1003] storage write error: {0}")]
    StorageWrite(String),

    /// The event kind has no handler (H1004).
    #[error("[H1004] unsupported event type: {0}")]
    UnsupportedEventType(String),
}

impl HandlerError {
    /// Returns the stable error code (H1001-H1004).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ReplyApi(_) => "H1001",
            Self::MediaFetch(_) => "H1002",
            Self::StorageWrite(_) => "H1003",
            Self::UnsupportedEventType(_) => "H1004",
        }
    }

    /// Returns the detail-free kind tag recorded in dispatch outcomes.
    pub const fn kind(&self) -> HandlerErrorKind {
        match self {
            Self::ReplyApi(_) => HandlerErrorKind::ReplyApi,
            Self::MediaFetch(_) => HandlerErrorKind::MediaFetch,
            Self::StorageWrite(_) => HandlerErrorKind::StorageWrite,
            Self::UnsupportedEventType(_) => HandlerErrorKind::UnsupportedEventType,
        }
    }
}

/// Kind tag for a failed dispatch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerErrorKind {
    /// Reply API call failed.
    ReplyApi,
    /// Media content fetch failed.
    MediaFetch,
    /// Object storage write failed.
    StorageWrite,
    /// Event kind has no handler.
    UnsupportedEventType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AuthError::SecretUnavailable.code(), "A1001");
        assert_eq!(AuthError::SignatureMismatch.code(), "A1002");
        assert_eq!(AuthError::MissingSignature.code(), "A1003");
        assert_eq!(PayloadError::MalformedBody(String::new()).code(), "P1001");
        assert_eq!(HandlerError::ReplyApi(String::new()).code(), "H1001");
        assert_eq!(HandlerError::UnsupportedEventType(String::new()).code(), "H1004");
    }

    #[test]
    fn handler_error_maps_to_outcome_kind() {
        assert_eq!(
            HandlerError::MediaFetch("timeout".into()).kind(),
            HandlerErrorKind::MediaFetch
        );
        assert_eq!(
            HandlerError::StorageWrite("503".into()).kind(),
            HandlerErrorKind::StorageWrite
        );
    }
}
