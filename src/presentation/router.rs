use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::InferenceClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    completion_handler, get_conversation_handler, health_handler, list_conversations_handler,
    post_message_handler, start_conversation_handler, stream_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<I>(state: AppState<I>) -> Router
where
    I: InferenceClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/conversations",
            get(list_conversations_handler::<I>).post(start_conversation_handler::<I>),
        )
        .route(
            "/api/conversations/{conversation_id}",
            get(get_conversation_handler::<I>),
        )
        .route(
            "/api/conversations/{conversation_id}/messages",
            post(post_message_handler::<I>),
        )
        .route(
            "/api/conversations/{conversation_id}/stream",
            get(stream_handler::<I>),
        )
        .route(
            "/api/conversations/{conversation_id}/completions",
            post(completion_handler::<I>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
