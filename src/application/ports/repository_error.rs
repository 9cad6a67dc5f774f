#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    /// The referenced conversation does not exist.
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}
