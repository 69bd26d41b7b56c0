//! Core domain types for the kotori webhook pipeline.
//!
//! Provides the message event model, per-event dispatch outcomes, channel
//! credentials, and the error taxonomy shared by every other crate. No I/O
//! lives here; collaborators and handlers depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod error;
pub mod events;

pub use credentials::ChannelCredentials;
pub use error::{AuthError, HandlerError, HandlerErrorKind, PayloadError};
pub use events::{DispatchOutcome, DispatchSummary, FileEvent, MessageEvent, TextEvent};
