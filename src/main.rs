use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use relaychat::application::ports::ConversationRepository;
use relaychat::application::services::ChatService;
use relaychat::infrastructure::llm::OllamaClient;
use relaychat::infrastructure::observability::{TracingConfig, init_tracing};
use relaychat::infrastructure::persistence::{
    SqliteConversationRepository, create_pool, run_migrations,
};
use relaychat::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = Settings::load()?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));

    let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
    run_migrations(&pool).await?;

    let repository: Arc<dyn ConversationRepository> =
        Arc::new(SqliteConversationRepository::new(pool));
    let inference_client = Arc::new(OllamaClient::new(&settings.inference)?);

    tracing::info!(
        endpoint = %settings.inference.endpoint,
        model = %settings.inference.model,
        context_limit = settings.inference.context_limit,
        "Inference backend configured"
    );

    let chat_service = Arc::new(ChatService::new(
        inference_client,
        repository,
        settings.chat_policy(),
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let router = create_router(AppState::new(chat_service, settings));

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
