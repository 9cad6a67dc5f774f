mod test_sqlite;

pub use stubs::{InMemoryConversationRepository, ScriptedInferenceClient};
pub use test_sqlite::TestSqlite;

/// Port that was open a moment ago and now refuses connections.
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind a free port");
    let port = listener
        .local_addr()
        .expect("Failed to read the free port")
        .port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/chat", port)
}
