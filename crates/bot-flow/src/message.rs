//! Boundary types exchanged with the transport.

use bot_core::ConversationId;
use bot_econ::ChartSpec;
use serde::Serialize;

/// Payload of an inbound reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyContent {
    /// Typed text or the text of a pressed button.
    Text(String),
    /// A sticker, photo, document or other non-text event.
    NonText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyEvent {
    pub conversation: ConversationId,
    pub content: ReplyContent,
}

impl ReplyEvent {
    pub fn text(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation,
            content: ReplyContent::Text(text.into()),
        }
    }

    pub fn non_text(conversation: ConversationId) -> Self {
        Self {
            conversation,
            content: ReplyContent::NonText,
        }
    }
}

/// One outbound message, before it is addressed to a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// Text with an optional fixed set of quick-reply labels.
    Prompt {
        text: String,
        quick_replies: Vec<String>,
    },
    /// Formatted outcome of a completed task.
    Result { text: String },
    /// Chart for the transport to render and send as an image.
    Chart { chart: ChartSpec },
}

impl Reply {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::prompt_with(text, Vec::new())
    }

    pub fn prompt_with(text: impl Into<String>, quick_replies: Vec<String>) -> Self {
        Reply::Prompt {
            text: text.into(),
            quick_replies,
        }
    }

    /// Message text; charts carry none.
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Prompt { text, .. } | Reply::Result { text } => Some(text.as_str()),
            Reply::Chart { .. } => None,
        }
    }

    pub fn quick_replies(&self) -> &[String] {
        match self {
            Reply::Prompt { quick_replies, .. } => quick_replies,
            _ => &[],
        }
    }
}

/// A reply addressed to its conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outbound {
    pub conversation: ConversationId,
    pub reply: Reply,
}
