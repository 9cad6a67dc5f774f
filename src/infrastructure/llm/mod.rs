mod ollama_client;
mod stream_line;

pub use ollama_client::OllamaClient;
pub use stream_line::{StreamLine, parse_stream_line};
