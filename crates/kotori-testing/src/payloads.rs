//! Webhook payload builders matching the platform's wire format.

use serde_json::{json, Value};

/// A text message event.
pub fn text_event(reply_token: &str, text: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "message": { "type": "text", "text": text },
    })
}

/// A file upload event with an explicit file name.
pub fn file_event(reply_token: &str, media_id: &str, file_name: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "message": { "type": "file", "id": media_id, "fileName": file_name },
    })
}

/// An image upload event; the platform sends no file name for these.
pub fn image_event(reply_token: &str, media_id: &str) -> Value {
    json!({
        "type": "message",
        "replyToken": reply_token,
        "message": { "type": "image", "id": media_id },
    })
}

/// An event kind the pipeline does not handle.
pub fn unsupported_event(kind: &str) -> Value {
    json!({ "type": kind, "replyToken": "unused" })
}

/// Wraps events into a webhook body, serialized to bytes.
pub fn webhook_body(events: &[Value]) -> Vec<u8> {
    serde_json::to_vec(&json!({ "events": events })).expect("payload serializes")
}
