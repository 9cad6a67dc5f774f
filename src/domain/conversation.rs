use super::{ConversationId, Message, MessageContent};
use chrono::{DateTime, Utc};

const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Opens a conversation together with its first user message.
    ///
    /// The two must be persisted together; a conversation never exists without a message.
    pub fn start(first_message: MessageContent, title_length: usize) -> (Self, Message) {
        let id = ConversationId::new();
        let title = derive_title(first_message.as_str(), title_length);
        let message = Message::user(id, first_message);

        let conversation = Self {
            id,
            title,
            messages: vec![message.clone()],
            created_at: message.created_at,
            updated_at: message.created_at,
        };

        (conversation, message)
    }
}

/// Summary row for conversation listings.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn derive_title(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TITLE_ELLIPSIS),
        None => content.to_string(),
    }
}
