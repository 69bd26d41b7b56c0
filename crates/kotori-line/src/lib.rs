//! LINE messaging-platform collaborator.
//!
//! Wraps the three platform surfaces the pipeline needs: webhook payload
//! parsing (verified raw bytes to ordered message events), the reply API,
//! and the media content-fetch API. Signature verification does NOT live
//! here; the authorizer runs before any of this code sees a body.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod webhook;

pub use client::{LineApiError, LineClient, LineConfig, MediaContent, MessagingApi};
pub use webhook::parse_events;
