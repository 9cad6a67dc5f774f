mod context_message;
mod conversation;
mod ids;
mod message;
mod message_content;
mod message_role;

pub use context_message::ContextMessage;
pub use conversation::{Conversation, ConversationSummary, derive_title};
pub use ids::{ConversationId, MessageId};
pub use message::Message;
pub use message_content::{MessageContent, ValidationError};
pub use message_role::MessageRole;
