use std::fmt;

/// User-supplied message text that passed validation.
///
/// Surrounding whitespace is trimmed; the length limit is counted in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("message is empty")]
    Empty,
    #[error("message exceeds {max} characters")]
    TooLong { max: usize },
}

impl MessageContent {
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.chars().count() > max_length {
            return Err(ValidationError::TooLong { max: max_length });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
