use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::ports::InferenceClient;
use crate::domain::ConversationId;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::ApiError;
use super::types::{
    ConversationDto, ConversationSummaryDto, ListQuery, NewMessageRequest, PostedMessageResponse,
    StartConversationResponse, stream_url,
};

const MAX_LIST_LIMIT: usize = 100;

#[tracing::instrument(skip(state, query))]
pub async fn list_conversations_handler<I>(
    State(state): State<AppState<I>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    I: InferenceClient + 'static,
{
    let limit = query
        .limit
        .unwrap_or(state.settings.chat.recent_conversations_limit)
        .min(MAX_LIST_LIMIT);

    match state.chat_service.recent_conversations(limit).await {
        Ok(summaries) => Json(
            summaries
                .into_iter()
                .map(ConversationSummaryDto::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => ApiError::from_chat(&e, &state.settings.messages).into_response(),
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn start_conversation_handler<I>(
    State(state): State<AppState<I>>,
    payload: Result<Json<NewMessageRequest>, JsonRejection>,
) -> Response
where
    I: InferenceClient + 'static,
{
    let messages = &state.settings.messages;
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::invalid_json(&rejection, messages).into_response(),
    };

    tracing::debug!(prompt = %sanitize_prompt(&request.message), "Starting conversation");

    match state.chat_service.start_conversation(&request.message).await {
        Ok((conversation, message)) => (
            StatusCode::CREATED,
            Json(StartConversationResponse {
                conversation_id: conversation.id.as_uuid(),
                message_id: message.id.as_uuid(),
                title: conversation.title,
                stream_url: stream_url(conversation.id, message.id),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from_chat(&e, messages).into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_conversation_handler<I>(
    State(state): State<AppState<I>>,
    Path(conversation_id): Path<Uuid>,
) -> Response
where
    I: InferenceClient + 'static,
{
    match state
        .chat_service
        .conversation(ConversationId::from_uuid(conversation_id))
        .await
    {
        Ok(conversation) => Json(ConversationDto::from(conversation)).into_response(),
        Err(e) => ApiError::from_chat(&e, &state.settings.messages).into_response(),
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn post_message_handler<I>(
    State(state): State<AppState<I>>,
    Path(conversation_id): Path<Uuid>,
    payload: Result<Json<NewMessageRequest>, JsonRejection>,
) -> Response
where
    I: InferenceClient + 'static,
{
    let messages = &state.settings.messages;
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::invalid_json(&rejection, messages).into_response(),
    };

    tracing::debug!(prompt = %sanitize_prompt(&request.message), "Posting user message");

    let conversation_id = ConversationId::from_uuid(conversation_id);
    match state
        .chat_service
        .post_user_message(conversation_id, &request.message)
        .await
    {
        Ok(message) => (
            StatusCode::CREATED,
            Json(PostedMessageResponse {
                message_id: message.id.as_uuid(),
                created_at: message.created_at,
                stream_url: stream_url(conversation_id, message.id),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from_chat(&e, messages).into_response(),
    }
}
