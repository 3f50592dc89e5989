use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{MarkupError, MarkupResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Message payload. Attachments carry an inline `data:` URI and are never
/// run through the markdown formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
    Image { data_uri: String },
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A chat message; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Unique within the process, increasing in creation order
    pub id: u64,
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

impl RawMessage {
    /// User input, trimmed. Blank input is a caller bug.
    pub fn user_text(text: &str) -> MarkupResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MarkupError::InvalidArgument(
                "user message must not be blank".to_string(),
            ));
        }
        Ok(Self::now(Sender::User, MessageContent::Text { text: text.to_string() }))
    }

    /// Bot reply, kept verbatim so product blocks and line breaks survive.
    pub fn bot_text(text: impl Into<String>) -> MarkupResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MarkupError::InvalidArgument(
                "bot reply must not be blank".to_string(),
            ));
        }
        Ok(Self::now(Sender::Bot, MessageContent::Text { text }))
    }

    pub fn image(sender: Sender, data_uri: impl Into<String>) -> Self {
        Self::now(
            sender,
            MessageContent::Image {
                data_uri: data_uri.into(),
            },
        )
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    fn now(sender: Sender, content: MessageContent) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            sender,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Text payload, `None` for attachments
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(text),
            MessageContent::Image { .. } => None,
        }
    }

    /// Two-digit `HH:MM` in local time
    pub fn display_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_text_is_trimmed() {
        let msg = RawMessage::user_text("  hello \n").unwrap();
        assert_eq!(msg.text(), Some("hello"));
        assert!(msg.is_user());
    }

    #[test]
    fn test_blank_user_text_is_rejected() {
        assert!(matches!(
            RawMessage::user_text("   "),
            Err(MarkupError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bot_text_is_verbatim() {
        let msg = RawMessage::bot_text("line\n").unwrap();
        assert_eq!(msg.text(), Some("line\n"));
        assert_eq!(msg.sender, Sender::Bot);
    }

    #[test]
    fn test_display_time_is_two_digit() {
        let ts = Local.with_ymd_and_hms(2025, 3, 4, 9, 5, 0).unwrap();
        let msg = RawMessage::bot_text("hi").unwrap().with_timestamp(ts);
        assert_eq!(msg.display_time(), "09:05");
    }

    #[test]
    fn test_ids_increase_in_creation_order() {
        let first = RawMessage::user_text("a").unwrap();
        let second = RawMessage::image(Sender::User, "data:image/png;base64,AAAA");
        let third = RawMessage::bot_text("b").unwrap();
        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn test_timestamp_serializes_as_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 0).unwrap();
        let msg = RawMessage::bot_text("hi").unwrap().with_timestamp(ts);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"timestamp\":\"2025-03-04T09:05:00Z\""));
        assert!(json.contains("\"type\":\"text\""));
    }

    #[test]
    fn test_image_has_no_text() {
        let msg = RawMessage::image(Sender::User, "data:image/png;base64,AAAA");
        assert_eq!(msg.text(), None);
    }
}
