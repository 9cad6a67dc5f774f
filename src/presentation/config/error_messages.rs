use serde::Deserialize;

use crate::application::ports::InferenceError;
use crate::domain::ValidationError;

/// User-facing text for every failure the HTTP boundary reports.
///
/// The core only produces typed errors; wording lives here so it can be configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub empty_message: String,
    /// `{max}` is replaced with the configured limit.
    pub message_too_long: String,
    pub invalid_json: String,
    pub missing_message_id: String,
    pub conversation_not_found: String,
    pub message_not_found: String,
    pub connection: String,
    pub timeout: String,
    pub backend_error: String,
    pub no_response: String,
    pub storage: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            empty_message: "Message cannot be empty".to_string(),
            message_too_long: "Message is too long (max {max} characters)".to_string(),
            invalid_json: "Invalid JSON in request".to_string(),
            missing_message_id: "Missing message_id".to_string(),
            conversation_not_found: "Conversation not found".to_string(),
            message_not_found: "Message not found".to_string(),
            connection: "Could not connect to the local model".to_string(),
            timeout: "Request to the model timed out".to_string(),
            backend_error: "Sorry, the model returned an unexpected response".to_string(),
            no_response: "No response received from the model".to_string(),
            storage: "The response could not be saved".to_string(),
        }
    }
}

impl ErrorMessages {
    pub fn validation(&self, error: &ValidationError) -> String {
        match error {
            ValidationError::Empty => self.empty_message.clone(),
            ValidationError::TooLong { max } => {
                self.message_too_long.replace("{max}", &max.to_string())
            }
        }
    }

    pub fn inference(&self, error: &InferenceError) -> String {
        match error {
            InferenceError::Connection(_) => self.connection.clone(),
            InferenceError::Timeout(_) => self.timeout.clone(),
            InferenceError::Response(_) => self.backend_error.clone(),
            InferenceError::NoResponse => self.no_response.clone(),
        }
    }
}
