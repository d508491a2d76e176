use chrono::{DateTime, Utc};

use serde::Serialize;

use sqlx::{FromRow, PgConnection, PgExecutor};

use uuid::Uuid;

/// Inbox view of a conversation: the other participant and the latest message
#[derive(Debug, FromRow, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
    pub other_user_id: Uuid,
    pub other_user_name: String,
    pub last_message: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

pub struct ConversationsRepo;

impl ConversationsRepo {
    /// Find the direct conversation both users participate in, if any
    #[tracing::instrument(name = "Find a direct conversation", skip(executor))]
    pub async fn find_direct<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
        other_user_id: Uuid,
    ) -> sqlx::Result<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "select cp1.conversation_id \
             from conversation_participants cp1 \
             join conversation_participants cp2 \
               on cp1.conversation_id = cp2.conversation_id \
             where cp1.user_id = $1 and cp2.user_id = $2 \
             limit 1",
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_optional(executor)
        .await
    }

    #[tracing::instrument(name = "Create a direct conversation", skip(conn))]
    pub async fn create_direct(
        conn: &mut PgConnection,
        user_id: Uuid,
        other_user_id: Uuid,
    ) -> sqlx::Result<Uuid> {
        let conversation_id = sqlx::query_scalar::<_, Uuid>(
            "insert into conversations default values returning id",
        )
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "insert into conversation_participants(conversation_id, user_id) \
             values ($1, $2), ($1, $3)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(other_user_id)
        .execute(conn)
        .await?;

        Ok(conversation_id)
    }

    #[tracing::instrument(name = "List conversations for a user", skip(executor))]
    pub async fn fetch_for_user<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> sqlx::Result<Vec<ConversationSummary>> {
        sqlx::query_as::<_, ConversationSummary>(
            "select c.id, c.updated_at, u.id as other_user_id, \
                    u.display_name as other_user_name, m.content as last_message \
             from conversations c \
             join conversation_participants me \
               on me.conversation_id = c.id and me.user_id = $1 \
             join conversation_participants them \
               on them.conversation_id = c.id and them.user_id <> $1 \
             join users u on u.id = them.user_id \
             left join lateral ( \
                 select content from messages \
                 where conversation_id = c.id \
                 order by sent_at desc limit 1 \
             ) m on true \
             order by c.updated_at desc",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Check conversation membership", skip(executor))]
    pub async fn is_participant<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "select exists( \
                 select 1 from conversation_participants \
                 where conversation_id = $1 and user_id = $2)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "List other participants", skip(executor))]
    pub async fn participants_except<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "select user_id from conversation_participants \
             where conversation_id = $1 and user_id <> $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Touch a conversation", skip(executor))]
    pub async fn touch<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
    ) -> sqlx::Result<()> {
        sqlx::query("update conversations set updated_at = now() where id = $1")
            .bind(conversation_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

pub struct MessagesRepo;

impl MessagesRepo {
    #[tracing::instrument(name = "Insert a message", skip(executor, content))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> sqlx::Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "insert into messages(conversation_id, sender_id, content) \
             values ($1, $2, $3) returning id",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(executor)
        .await
    }

    /// Chronological transcript of a conversation
    #[tracing::instrument(name = "List messages", skip(executor))]
    pub async fn list<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
    ) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "select id, conversation_id, sender_id, content, sent_at, is_read \
             from messages where conversation_id = $1 order by sent_at",
        )
        .bind(conversation_id)
        .fetch_all(executor)
        .await
    }

    /// Latest message sent by anyone other than `user_id`; context for the
    /// canned-reply generator
    #[tracing::instrument(name = "Fetch last received message", skip(executor))]
    pub async fn last_received<'con>(
        executor: impl PgExecutor<'con>,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<Message>> {
        sqlx::query_as::<_, Message>(
            "select id, conversation_id, sender_id, content, sent_at, is_read \
             from messages \
             where conversation_id = $1 and sender_id <> $2 \
             order by sent_at desc limit 1",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}
