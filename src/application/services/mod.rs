mod chat_service;
mod context_builder;
mod stream_relay;

pub use chat_service::{ChatError, ChatPolicy, ChatService};
pub use context_builder::{ContextBuilder, build_context};
pub use stream_relay::{RelayEvent, RelayStream, StreamFailure, relay};
