//! Webhook payload parsing.
//!
//! Turns a verified raw body into an ordered sequence of [`MessageEvent`]s.
//! Unknown event or message kinds classify as `Unsupported` rather than
//! failing the whole payload: one odd event must not block its siblings.
//! Only a body that cannot be interpreted at all is a [`PayloadError`].

use kotori_core::{FileEvent, MessageEvent, PayloadError, TextEvent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, rename = "replyToken")]
    reply_token: Option<String>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "fileName")]
    file_name: Option<String>,
}

/// Parses a verified webhook body into message events, order preserved.
///
/// The bytes must be exactly what the signature was computed over; this
/// function never re-serializes. An empty `events` array is valid (the
/// platform sends one as a connectivity probe) and yields an empty vec.
///
/// # Errors
///
/// Returns [`PayloadError::MalformedBody`] when the body is not a JSON
/// object of the expected envelope shape.
pub fn parse_events(raw: &[u8]) -> Result<Vec<MessageEvent>, PayloadError> {
    let payload: WebhookPayload =
        serde_json::from_slice(raw).map_err(|e| PayloadError::MalformedBody(e.to_string()))?;
    Ok(payload.events.into_iter().map(classify).collect())
}

/// Classifies one raw event into a pipeline variant.
fn classify(event: RawEvent) -> MessageEvent {
    if event.kind != "message" {
        return MessageEvent::Unsupported { kind: event.kind };
    }
    let Some(reply_token) = event.reply_token.filter(|t| !t.is_empty()) else {
        return MessageEvent::Unsupported { kind: "message/no-reply-token".to_string() };
    };
    let Some(message) = event.message else {
        return MessageEvent::Unsupported { kind: "message/empty".to_string() };
    };

    match message.kind.as_str() {
        "text" => match message.text {
            Some(text) => MessageEvent::Text(TextEvent { reply_token, text }),
            None => MessageEvent::Unsupported { kind: "message/text-without-body".to_string() },
        },
        "image" | "video" | "audio" | "file" => {
            let Some(media_id) = message.id else {
                return MessageEvent::Unsupported {
                    kind: format!("message/{}-without-id", message.kind),
                };
            };
            let file_name = message
                .file_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_file_name(&message.kind, &media_id));
            MessageEvent::File(FileEvent { reply_token, media_id, file_name })
        },
        other => MessageEvent::Unsupported { kind: format!("message/{other}") },
    }
}

/// Derives a file name for media kinds that carry none (image, video, audio).
fn default_file_name(kind: &str, media_id: &str) -> String {
    let extension = match kind {
        "image" => "jpg",
        "video" => "mp4",
        "audio" => "m4a",
        _ => "bin",
    };
    format!("{media_id}.{extension}")
}
