use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::{RelayEvent, StreamFailure};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageId,
};
use crate::presentation::config::ErrorMessages;

#[derive(Debug, Deserialize)]
pub struct NewMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub message_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub message_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StartConversationResponse {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub title: String,
    pub stream_url: String,
}

#[derive(Debug, Serialize)]
pub struct PostedMessageResponse {
    pub message_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stream_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub role: &'static str,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.as_uuid(),
            role: message.role.api_name(),
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationDto {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageDto>,
}

impl From<Conversation> for ConversationDto {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id.as_uuid(),
            title: conversation.title,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            messages: conversation
                .messages
                .into_iter()
                .map(MessageDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConversationSummary> for ConversationSummaryDto {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            id: summary.id.as_uuid(),
            title: summary.title,
            message_count: summary.message_count,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        }
    }
}

/// Wire form of one SSE `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Token { content: String },
    Error { content: String },
    Done { timestamp: String },
}

impl StreamEvent {
    pub fn from_relay(event: RelayEvent, messages: &ErrorMessages, timestamp_format: &str) -> Self {
        match event {
            RelayEvent::Token(content) => StreamEvent::Token { content },
            RelayEvent::Failed(StreamFailure::Inference(error)) => StreamEvent::Error {
                content: messages.inference(&error),
            },
            RelayEvent::Failed(StreamFailure::Persistence(_)) => StreamEvent::Error {
                content: messages.storage.clone(),
            },
            RelayEvent::Done(message) => StreamEvent::Done {
                timestamp: format_timestamp(message.created_at, timestamp_format),
            },
        }
    }
}

/// Falls back to RFC 3339 when the configured format string is invalid.
pub fn format_timestamp(at: DateTime<Utc>, format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", at.format(format)).is_err() {
        return at.to_rfc3339();
    }
    rendered
}

pub fn stream_url(conversation_id: ConversationId, message_id: MessageId) -> String {
    format!(
        "/api/conversations/{}/stream?message_id={}",
        conversation_id, message_id
    )
}
