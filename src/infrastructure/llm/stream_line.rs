use serde_json::Value;
use tracing::debug;

/// Decoded form of one line of an NDJSON chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLine {
    Fragment(String),
    /// Well-formed line that carries no text, e.g. the closing `"done": true` object.
    Empty,
    /// `message.content` is present but is not a string.
    Unexpected(String),
    /// The backend reported a failure in-band.
    BackendError(String),
}

/// Decodes one line. Returns `None` when the line is not valid JSON; such lines are skipped.
pub fn parse_stream_line(line: &[u8]) -> Option<StreamLine> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Some(StreamLine::Empty);
    }

    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, bytes = line.len(), "Skipping malformed stream line");
            return None;
        }
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Some(StreamLine::BackendError(message.to_string()));
    }

    match value.pointer("/message/content") {
        None | Some(Value::Null) => Some(StreamLine::Empty),
        Some(Value::String(content)) if content.is_empty() => Some(StreamLine::Empty),
        Some(Value::String(content)) => Some(StreamLine::Fragment(content.clone())),
        Some(other) => Some(StreamLine::Unexpected(format!(
            "message.content is not a string: {}",
            other
        ))),
    }
}
