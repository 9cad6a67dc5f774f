use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::ChatError;
use crate::presentation::config::ErrorMessages;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub r#type: &'static str,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    kind: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: String) -> Self {
        Self {
            status,
            message,
            kind,
        }
    }

    pub fn from_chat(error: &ChatError, messages: &ErrorMessages) -> Self {
        match error {
            ChatError::Validation(e) => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                messages.validation(e),
            ),
            ChatError::ConversationNotFound(_) => Self::new(
                StatusCode::NOT_FOUND,
                "not_found_error",
                messages.conversation_not_found.clone(),
            ),
            ChatError::MessageNotFound(_) => Self::message_not_found(messages),
            ChatError::Inference(e) => {
                tracing::error!(error = %e, "Completion failed");
                let status = if e.is_connection() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::BAD_GATEWAY
                };
                Self::new(status, "backend_error", messages.inference(e))
            }
            ChatError::Repository(e) => {
                tracing::error!(error = %e, "Storage failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    messages.storage.clone(),
                )
            }
        }
    }

    pub fn missing_message_id(messages: &ErrorMessages) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
            messages.missing_message_id.clone(),
        )
    }

    pub fn message_not_found(messages: &ErrorMessages) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found_error",
            messages.message_not_found.clone(),
        )
    }

    pub fn invalid_json(rejection: &JsonRejection, messages: &ErrorMessages) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Rejected request body");
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
            messages.invalid_json.clone(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: ErrorBody {
                    message: self.message,
                    r#type: self.kind,
                },
            }),
        )
            .into_response()
    }
}
