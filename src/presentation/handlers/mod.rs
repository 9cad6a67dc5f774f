mod chat;
mod conversations;
mod error;
mod health;
pub mod types;

pub use chat::{completion_handler, stream_handler};
pub use conversations::{
    get_conversation_handler, list_conversations_handler, post_message_handler,
    start_conversation_handler,
};
pub use error::{ApiError, ErrorBody, ErrorResponse};
pub use health::health_handler;
