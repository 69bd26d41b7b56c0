//! HTTP request handlers for the Kotori API.
//!
//! Handlers follow a consistent pattern:
//! - Input validation with appropriate error codes
//! - Tracing for observability
//! - Standardized error responses
//!
//! # Handler Organization
//!
//! - `webhook` - Signed webhook dispatch (echo replies, media persistence)
//! - `health` - Health check and readiness probes
//!
//! # Security
//!
//! The webhook handler only ever runs behind the signature middleware, so
//! it can assume the body bytes were authenticated. Handler failures never
//! change the HTTP status: reply tokens are single-use, so a platform retry
//! of a partially failed batch cannot succeed.

pub mod health;
pub mod webhook;

pub use health::{health_check, liveness_check, readiness_check};
pub use webhook::handle_webhook;
