use super::{ConversationId, MessageContent, MessageId, MessageRole};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: ConversationId, role: MessageRole, content: String) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn user(conversation_id: ConversationId, content: MessageContent) -> Self {
        Self::new(conversation_id, MessageRole::User, content.into_inner())
    }

    /// Model output is stored as received; it does not go through user-input validation.
    pub fn assistant(conversation_id: ConversationId, content: String) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content)
    }
}
