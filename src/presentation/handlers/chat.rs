use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderName;
use axum::http::header::CACHE_CONTROL;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::StreamExt;
use uuid::Uuid;

use crate::application::ports::InferenceClient;
use crate::domain::{ConversationId, MessageId};
use crate::presentation::state::AppState;

use super::error::ApiError;
use super::types::{CompletionRequest, MessageDto, StreamEvent, StreamQuery};

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Streams the assistant's answer to a previously posted user message as Server-Sent Events.
///
/// Each `data:` line is one [`StreamEvent`]. The body ends after the first `done` or `error`.
#[tracing::instrument(skip(state, query), fields(message_id = ?query.message_id))]
pub async fn stream_handler<I>(
    State(state): State<AppState<I>>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<StreamQuery>,
) -> Response
where
    I: InferenceClient + 'static,
{
    let messages = &state.settings.messages;

    let Some(raw_id) = query.message_id.filter(|id| !id.trim().is_empty()) else {
        tracing::warn!("Stream opened without message_id");
        return ApiError::missing_message_id(messages).into_response();
    };
    let Ok(message_id) = raw_id.parse::<MessageId>() else {
        return ApiError::message_not_found(messages).into_response();
    };

    let relay = match state
        .chat_service
        .open_stream(ConversationId::from_uuid(conversation_id), message_id)
        .await
    {
        Ok(relay) => relay,
        Err(e) => return ApiError::from_chat(&e, messages).into_response(),
    };

    let error_messages = messages.clone();
    let timestamp_format = state.settings.chat.timestamp_format.clone();
    let sse_stream = relay.map(move |event| {
        let payload = StreamEvent::from_relay(event, &error_messages, &timestamp_format);
        let json = serde_json::to_string(&payload).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(json))
    });

    let keep_alive_seconds = state.settings.inference.sse_keep_alive_seconds;

    (
        [(CACHE_CONTROL, "no-cache"), (X_ACCEL_BUFFERING, "no")],
        Sse::new(sse_stream).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(keep_alive_seconds))
                .text("keep-alive"),
        ),
    )
        .into_response()
}

/// Waits for the whole answer instead of streaming it.
#[tracing::instrument(skip(state, payload))]
pub async fn completion_handler<I>(
    State(state): State<AppState<I>>,
    Path(conversation_id): Path<Uuid>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> Response
where
    I: InferenceClient + 'static,
{
    let messages = &state.settings.messages;
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::invalid_json(&rejection, messages).into_response(),
    };

    match state
        .chat_service
        .complete(
            ConversationId::from_uuid(conversation_id),
            MessageId::from_uuid(request.message_id),
        )
        .await
    {
        Ok(message) => Json(MessageDto::from(message)).into_response(),
        Err(e) => ApiError::from_chat(&e, messages).into_response(),
    }
}
