use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::io::StreamReader;
use tracing::{debug, instrument, warn};

use crate::application::ports::{
    InferenceClient, InferenceError, InferenceEvent, InferenceStream,
};
use crate::domain::ContextMessage;
use crate::presentation::config::InferenceSettings;

use super::stream_line::{StreamLine, parse_stream_line};

const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Client for Ollama's `/api/chat` endpoint.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
    chat_timeout: Duration,
    stream_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let chat_timeout = settings.chat_timeout();
        let stream_timeout = settings.stream_timeout();

        let client = Client::builder()
            .connect_timeout(chat_timeout.min(stream_timeout))
            .build()
            .map_err(|e| InferenceError::Connection(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            chat_timeout,
            stream_timeout,
        })
    }

    fn request_body(&self, messages: Vec<ContextMessage>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages
                .into_iter()
                .map(|m| WireMessage {
                    role: m.role.api_name(),
                    content: m.content,
                })
                .collect(),
            stream,
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ContextMessage]) -> Result<String, InferenceError> {
        let body = self.request_body(messages.to_vec(), false);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e, self.chat_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "Completion request rejected");
            return Err(InferenceError::Response(format!("HTTP {}: {}", status, detail)));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| classify_transport(&e, self.chat_timeout))?;

        debug!(chars = payload.message.content.chars().count(), "Completion received");
        Ok(payload.message.content)
    }

    fn complete_stream(&self, messages: Vec<ContextMessage>) -> InferenceStream {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let model = self.model.clone();
        let timeout = self.stream_timeout;
        let body = self.request_body(messages, true);

        Box::pin(async_stream::stream! {
            debug!(%endpoint, %model, messages = body.messages.len(), "Opening completion stream");

            let sent = tokio::time::timeout(timeout, client.post(&endpoint).json(&body).send()).await;
            let response = match sent {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    let failure = classify_transport(&e, timeout);
                    warn!(error = %failure, "Completion stream request failed");
                    yield InferenceEvent::Error(failure);
                    return;
                }
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Completion stream request timed out");
                    yield InferenceEvent::Error(InferenceError::Timeout(timeout));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let detail = tokio::time::timeout(timeout, response.text())
                    .await
                    .ok()
                    .and_then(Result::ok)
                    .unwrap_or_default();
                warn!(%status, "Completion stream rejected");
                yield InferenceEvent::Error(InferenceError::Response(format!("HTTP {}: {}", status, detail)));
                return;
            }

            let bytes = Box::pin(response.bytes_stream().map_err(io::Error::other));
            let mut lines = FramedRead::new(
                StreamReader::new(bytes),
                AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), MAX_LINE_BYTES),
            );
            let mut full_text = String::new();
            // FramedRead reports one `None` right after a decode error before it resumes.
            let mut resuming = false;

            loop {
                let next = match tokio::time::timeout(timeout, lines.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(timeout_secs = timeout.as_secs(), "Completion stream stalled");
                        yield InferenceEvent::Error(InferenceError::Timeout(timeout));
                        return;
                    }
                };

                let line = match next {
                    Some(Ok(line)) => {
                        resuming = false;
                        line
                    }
                    Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
                        warn!(max_bytes = MAX_LINE_BYTES, "Skipping oversized stream line");
                        resuming = true;
                        yield InferenceEvent::Error(InferenceError::Response(format!(
                            "stream line exceeds {} bytes",
                            MAX_LINE_BYTES
                        )));
                        continue;
                    }
                    Some(Err(AnyDelimiterCodecError::Io(e))) => {
                        let failure = classify_read(e, timeout);
                        warn!(error = %failure, "Completion stream interrupted");
                        yield InferenceEvent::Error(failure);
                        return;
                    }
                    None if resuming => {
                        resuming = false;
                        continue;
                    }
                    None => break,
                };

                match parse_stream_line(&line) {
                    None | Some(StreamLine::Empty) => continue,
                    Some(StreamLine::Fragment(fragment)) => {
                        full_text.push_str(&fragment);
                        yield InferenceEvent::Token(fragment);
                    }
                    Some(StreamLine::Unexpected(reason)) => {
                        warn!(%reason, "Unusable stream line");
                        yield InferenceEvent::Error(InferenceError::Response(reason));
                    }
                    Some(StreamLine::BackendError(message)) => {
                        warn!(%message, "Backend reported an error mid-stream");
                        yield InferenceEvent::Error(InferenceError::Response(message));
                        return;
                    }
                }
            }

            if full_text.is_empty() {
                yield InferenceEvent::Error(InferenceError::NoResponse);
            } else {
                debug!(chars = full_text.chars().count(), "Completion stream finished");
                yield InferenceEvent::Done(full_text);
            }
        })
    }
}

fn classify_transport(error: &reqwest::Error, timeout: Duration) -> InferenceError {
    if error.is_timeout() {
        InferenceError::Timeout(timeout)
    } else if error.is_decode() {
        InferenceError::Response(error_chain(error))
    } else {
        InferenceError::Connection(error_chain(error))
    }
}

fn classify_read(error: io::Error, timeout: Duration) -> InferenceError {
    match error
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
    {
        Some(transport) => classify_transport(transport, timeout),
        None => InferenceError::Connection(error.to_string()),
    }
}

/// reqwest's own message omits the cause ("connection refused" and the like).
fn error_chain(error: &dyn StdError) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
