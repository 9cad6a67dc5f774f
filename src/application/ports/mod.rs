mod conversation_repository;
mod inference_client;
mod repository_error;

pub use conversation_repository::ConversationRepository;
pub use inference_client::{InferenceClient, InferenceError, InferenceEvent, InferenceStream};
pub use repository_error::RepositoryError;
