use crate::domain::{Conversation, ConversationId, ConversationSummary, Message, MessageId};
use async_trait::async_trait;

use super::RepositoryError;

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Stores the conversation and its first message in one transaction.
    async fn create_conversation(
        &self,
        conversation: &Conversation,
        first_message: &Message,
    ) -> Result<(), RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    async fn list_recent(&self, limit: usize) -> Result<Vec<ConversationSummary>, RepositoryError>;

    /// Inserts the message and advances the owning conversation's `updated_at`, atomically.
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError>;

    async fn find_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Option<Message>, RepositoryError>;

    /// Most recent `limit` messages, oldest first.
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError>;
}
