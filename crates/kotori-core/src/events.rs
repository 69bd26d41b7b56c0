//! Message events and per-event dispatch outcomes.
//!
//! A webhook call carries zero or more events; each is classified into one of
//! the variants below and dispatched independently, in arrival order. Reply
//! tokens are single-use and bound to their event, so ordering and per-event
//! isolation matter more than throughput here.

use serde::{Deserialize, Serialize};

use crate::error::HandlerErrorKind;

/// A single event parsed from a verified webhook body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    /// A text message to echo back.
    Text(TextEvent),
    /// An uploaded file or media object to persist.
    File(FileEvent),
    /// Any event kind the pipeline does not handle (follow, postback, ...).
    Unsupported {
        /// The platform's event or message kind, for diagnostics.
        kind: String,
    },
}

impl MessageEvent {
    /// Short name of the variant, used in log fields.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::File(_) => "file",
            Self::Unsupported { kind } => kind,
        }
    }
}

/// A text message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    /// Single-use token for replying to this event.
    pub reply_token: String,
    /// Message text as sent by the user.
    pub text: String,
}

/// A file or media upload event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Single-use token for replying to this event.
    pub reply_token: String,
    /// Platform-assigned unique id for the uploaded content.
    pub media_id: String,
    /// File name supplied by the platform, or derived from the media kind.
    pub file_name: String,
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Echo reply sent.
    Replied,
    /// Media persisted to object storage and confirmation sent.
    Stored {
        /// Object key the content was written under.
        object_key: String,
    },
    /// The event's handler failed; siblings are unaffected.
    Failed {
        /// What failed, without internal detail.
        kind: HandlerErrorKind,
    },
}

impl DispatchOutcome {
    /// Whether this outcome records a handler failure.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Ordered per-event outcomes for one webhook call.
///
/// Serialized as the response body. The HTTP status is success whenever the
/// request authorized and parsed, regardless of how many outcomes failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Outcomes in event arrival order.
    pub outcomes: Vec<DispatchOutcome>,
}

impl DispatchSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for the next event.
    pub fn push(&mut self, outcome: DispatchOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of events received.
    pub fn received(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of events that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Whether every event succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}
