use std::sync::Arc;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{ContextMessage, ConversationId, Message};

/// Most recent `limit` messages in chronological order.
///
/// Sorting happens before slicing the tail, so callers may pass messages in any order
/// (a newest-first query result included) and still get ascending context.
pub fn build_context(messages: &[Message], limit: usize) -> Vec<ContextMessage> {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by_key(|message| message.created_at);

    let skip = ordered.len().saturating_sub(limit);
    ordered
        .into_iter()
        .skip(skip)
        .map(ContextMessage::from)
        .collect()
}

pub struct ContextBuilder {
    repository: Arc<dyn ConversationRepository>,
    limit: usize,
}

impl ContextBuilder {
    pub fn new(repository: Arc<dyn ConversationRepository>, limit: usize) -> Self {
        Self { repository, limit }
    }

    #[tracing::instrument(skip(self), fields(limit = self.limit))]
    pub async fn build(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ContextMessage>, RepositoryError> {
        let messages = self
            .repository
            .get_messages(conversation_id, self.limit)
            .await?;

        Ok(build_context(&messages, self.limit))
    }
}
