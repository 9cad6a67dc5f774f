use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::{
    ConversationRepository, InferenceClient, InferenceError, RepositoryError,
};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageContent, MessageId,
    ValidationError,
};

use super::context_builder::ContextBuilder;
use super::stream_relay::{RelayStream, relay};

/// Limits applied to user input and to the context window.
#[derive(Debug, Clone, Copy)]
pub struct ChatPolicy {
    pub max_message_length: usize,
    pub title_length: usize,
    pub context_limit: usize,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_message_length: 10_000,
            title_length: 50,
            context_limit: 10,
        }
    }
}

pub struct ChatService<I>
where
    I: InferenceClient,
{
    inference_client: Arc<I>,
    repository: Arc<dyn ConversationRepository>,
    context_builder: ContextBuilder,
    policy: ChatPolicy,
}

impl<I> ChatService<I>
where
    I: InferenceClient,
{
    pub fn new(
        inference_client: Arc<I>,
        repository: Arc<dyn ConversationRepository>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            inference_client,
            context_builder: ContextBuilder::new(Arc::clone(&repository), policy.context_limit),
            repository,
            policy,
        }
    }

    #[tracing::instrument(skip(self, text))]
    pub async fn start_conversation(
        &self,
        text: &str,
    ) -> Result<(Conversation, Message), ChatError> {
        let content = MessageContent::parse(text, self.policy.max_message_length)?;
        let (conversation, message) = Conversation::start(content, self.policy.title_length);

        self.repository
            .create_conversation(&conversation, &message)
            .await?;

        info!(conversation_id = %conversation.id, "Conversation started");
        Ok((conversation, message))
    }

    #[tracing::instrument(skip(self, text), fields(conversation_id = %conversation_id))]
    pub async fn post_user_message(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<Message, ChatError> {
        let content = MessageContent::parse(text, self.policy.max_message_length)?;
        let message = Message::user(conversation_id, content);

        self.repository
            .append_message(&message)
            .await
            .map_err(|e| ChatError::from_repository(e, conversation_id))?;

        debug!(message_id = %message.id, "User message stored");
        Ok(message)
    }

    pub async fn recent_conversations(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.repository.list_recent(limit).await?)
    }

    pub async fn conversation(&self, id: ConversationId) -> Result<Conversation, ChatError> {
        self.repository
            .get_conversation(id)
            .await?
            .ok_or(ChatError::ConversationNotFound(id))
    }

    /// Resolves a stream trigger into a relay over a fresh completion stream.
    ///
    /// The backend is not contacted until the returned stream is polled.
    #[tracing::instrument(skip(self), fields(conversation_id = %conversation_id, message_id = %message_id))]
    pub async fn open_stream(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<RelayStream, ChatError> {
        self.resolve_trigger(conversation_id, message_id).await?;

        let context = self.context_builder.build(conversation_id).await?;
        debug!(context_messages = context.len(), "Opening completion stream");

        let events = self.inference_client.complete_stream(context);
        Ok(relay(events, Arc::clone(&self.repository), conversation_id))
    }

    /// Non-streaming counterpart of [`ChatService::open_stream`]: waits for the whole answer,
    /// stores it and returns the stored message.
    #[tracing::instrument(skip(self), fields(conversation_id = %conversation_id, message_id = %message_id))]
    pub async fn complete(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Message, ChatError> {
        self.resolve_trigger(conversation_id, message_id).await?;

        let context = self.context_builder.build(conversation_id).await?;
        let answer = self.inference_client.complete(&context).await?;

        if answer.is_empty() {
            return Err(ChatError::Inference(InferenceError::NoResponse));
        }

        let message = Message::assistant(conversation_id, answer);
        self.repository
            .append_message(&message)
            .await
            .map_err(|e| ChatError::from_repository(e, conversation_id))?;

        info!(message_id = %message.id, "Assistant response stored");
        Ok(message)
    }

    async fn resolve_trigger(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Message, ChatError> {
        match self
            .repository
            .find_message(conversation_id, message_id)
            .await?
        {
            Some(message) if message.role.is_user() => Ok(message),
            Some(_) => Err(ChatError::MessageNotFound(message_id)),
            None => {
                // Conversations are created with a message, so no messages means no conversation.
                let any = self.repository.get_messages(conversation_id, 1).await?;
                if any.is_empty() {
                    Err(ChatError::ConversationNotFound(conversation_id))
                } else {
                    Err(ChatError::MessageNotFound(message_id))
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("inference: {0}")]
    Inference(#[from] InferenceError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChatError {
    fn from_repository(error: RepositoryError, conversation_id: ConversationId) -> Self {
        match error {
            RepositoryError::ConversationNotFound(_) => Self::ConversationNotFound(conversation_id),
            other => Self::Repository(other),
        }
    }
}
