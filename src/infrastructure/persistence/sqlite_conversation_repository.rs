use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::instrument;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageId, MessageRole,
};

pub struct SqliteConversationRepository {
    pool: SqlitePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for SqliteConversationRepository {
    #[instrument(skip(self, conversation, first_message), fields(conversation_id = %conversation.id))]
    async fn create_conversation(
        &self,
        conversation: &Conversation,
        first_message: &Message,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, title, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        insert_message(&mut tx, first_message).await?;

        tx.commit().await.map_err(query_failed)?;
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %id))]
    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, created_at, updated_at
            FROM conversations
            WHERE id = ?
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let messages = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?
        .iter()
        .map(message_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Conversation {
            id: ConversationId::from_uuid(row.try_get("id").map_err(corrupt)?),
            title: row.try_get("title").map_err(corrupt)?,
            messages,
            created_at: row.try_get("created_at").map_err(corrupt)?,
            updated_at: row.try_get("updated_at").map_err(corrupt)?,
        }))
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.title, c.created_at, c.updated_at, COUNT(m.id) AS message_count
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            GROUP BY c.id
            ORDER BY c.updated_at DESC, c.rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.iter()
            .map(|row| {
                let message_count: i64 = row.try_get("message_count").map_err(corrupt)?;
                Ok(ConversationSummary {
                    id: ConversationId::from_uuid(row.try_get("id").map_err(corrupt)?),
                    title: row.try_get("title").map_err(corrupt)?,
                    message_count: message_count.max(0) as usize,
                    created_at: row.try_get("created_at").map_err(corrupt)?,
                    updated_at: row.try_get("updated_at").map_err(corrupt)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, conversation_id = %message.conversation_id, role = %message.role))]
    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let touched = sqlx::query(
            r#"
            UPDATE conversations
            SET updated_at = MAX(updated_at, ?)
            WHERE id = ?
            "#,
        )
        .bind(message.created_at)
        .bind(message.conversation_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if touched.rows_affected() == 0 {
            return Err(RepositoryError::ConversationNotFound(
                message.conversation_id.to_string(),
            ));
        }

        insert_message(&mut tx, message).await?;

        tx.commit().await.map_err(query_failed)?;
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id, message_id = %message_id))]
    async fn find_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Option<Message>, RepositoryError> {
        sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE id = ? AND conversation_id = ?
            "#,
        )
        .bind(message_id.as_uuid())
        .bind(conversation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?
        .as_ref()
        .map(message_from_row)
        .transpose()
    }

    #[instrument(skip(self), fields(conversation_id = %conversation_id, limit = %limit))]
    async fn get_messages(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        messages.reverse();
        Ok(messages)
    }
}

async fn insert_message(conn: &mut SqliteConnection, message: &Message) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, role, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id.as_uuid())
    .bind(message.conversation_id.as_uuid())
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(message.created_at)
    .execute(conn)
    .await
    .map_err(query_failed)?;

    Ok(())
}

fn message_from_row(row: &SqliteRow) -> Result<Message, RepositoryError> {
    let role: String = row.try_get("role").map_err(corrupt)?;

    Ok(Message {
        id: MessageId::from_uuid(row.try_get("id").map_err(corrupt)?),
        conversation_id: ConversationId::from_uuid(
            row.try_get("conversation_id").map_err(corrupt)?,
        ),
        role: role
            .parse::<MessageRole>()
            .map_err(RepositoryError::CorruptRecord)?,
        content: row.try_get("content").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
    })
}

fn query_failed(error: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(error.to_string())
}

fn corrupt(error: sqlx::Error) -> RepositoryError {
    RepositoryError::CorruptRecord(error.to_string())
}
