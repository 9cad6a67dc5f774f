mod sqlite_conversation_repository;
mod sqlite_pool;

pub use sqlite_conversation_repository::SqliteConversationRepository;
pub use sqlite_pool::{create_pool, run_migrations};
