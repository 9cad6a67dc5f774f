use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::application::ports::{
    ConversationRepository, InferenceError, InferenceEvent, InferenceStream, RepositoryError,
};
use crate::domain::{ConversationId, Message};

/// Outbound event for one stream subscriber. `Failed` and `Done` are terminal.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Token(String),
    Failed(StreamFailure),
    Done(Message),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamFailure {
    #[error("inference: {0}")]
    Inference(#[from] InferenceError),
    #[error("persistence: {0}")]
    Persistence(#[from] RepositoryError),
}

pub type RelayStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send + 'static>>;

/// Forwards inference fragments and stores the assembled answer once the backend finishes.
///
/// The assistant message is appended only on `Done`, at most once, with the full text. Any
/// error ends the relay without touching storage. Dropping the returned stream drops the
/// upstream one, which closes the backend connection.
pub fn relay(
    mut events: InferenceStream,
    repository: Arc<dyn ConversationRepository>,
    conversation_id: ConversationId,
) -> RelayStream {
    Box::pin(async_stream::stream! {
        let mut watch = DisconnectWatch::new(conversation_id);

        while let Some(event) = events.next().await {
            match event {
                InferenceEvent::Token(fragment) => {
                    watch.forwarded += 1;
                    yield RelayEvent::Token(fragment);
                }
                InferenceEvent::Error(failure) => {
                    warn!(
                        conversation_id = %conversation_id,
                        error = %failure,
                        fragments = watch.forwarded,
                        "Completion stream failed"
                    );
                    watch.finish();
                    yield RelayEvent::Failed(StreamFailure::Inference(failure));
                    return;
                }
                InferenceEvent::Done(full_text) => {
                    let message = Message::assistant(conversation_id, full_text);
                    let stored = repository.append_message(&message).await;
                    watch.finish();

                    match stored {
                        Ok(()) => {
                            info!(
                                conversation_id = %conversation_id,
                                message_id = %message.id,
                                fragments = watch.forwarded,
                                chars = message.content.chars().count(),
                                "Assistant response stored"
                            );
                            yield RelayEvent::Done(message);
                        }
                        Err(failure) => {
                            error!(
                                conversation_id = %conversation_id,
                                error = %failure,
                                "Failed to store assistant response"
                            );
                            yield RelayEvent::Failed(StreamFailure::Persistence(failure));
                        }
                    }
                    return;
                }
            }
        }

        warn!(conversation_id = %conversation_id, "Completion stream ended without a terminal event");
        watch.finish();
        yield RelayEvent::Failed(StreamFailure::Inference(InferenceError::NoResponse));
    })
}

/// Logs when the relay is dropped before reaching a terminal event.
struct DisconnectWatch {
    conversation_id: ConversationId,
    forwarded: usize,
    finished: bool,
}

impl DisconnectWatch {
    fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            forwarded: 0,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for DisconnectWatch {
    fn drop(&mut self) {
        if !self.finished {
            info!(
                conversation_id = %self.conversation_id,
                fragments = self.forwarded,
                "Subscriber disconnected, backend stream released"
            );
        }
    }
}
