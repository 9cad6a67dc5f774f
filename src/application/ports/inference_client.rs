use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::ContextMessage;

/// One item of a streaming completion.
///
/// `Done` and `Error` variants produced at the end of the stream are terminal. A stream may also
/// carry a non-terminal `Error` for a single unusable line, after which tokens can still follow.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceEvent {
    Token(String),
    Error(InferenceError),
    Done(String),
}

pub type InferenceStream = Pin<Box<dyn Stream<Item = InferenceEvent> + Send + 'static>>;

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Single request, whole answer at once.
    async fn complete(&self, messages: &[ContextMessage]) -> Result<String, InferenceError>;

    /// Lazy event stream. No request is sent until the stream is first polled, and dropping
    /// the stream closes the backend connection.
    fn complete_stream(&self, messages: Vec<ContextMessage>) -> InferenceStream;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("invalid response: {0}")]
    Response(String),
    #[error("no response received from the model")]
    NoResponse,
}

impl InferenceError {
    /// Transport-level failures: the backend could not be reached in time.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}
