use chrono::{DateTime, Utc};

use serde::Serialize;

use sqlx::{FromRow, PgExecutor};

use uuid::Uuid;

#[derive(Debug, FromRow, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NotificationsRepo;

impl NotificationsRepo {
    #[tracing::instrument(name = "Insert a notification", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
        message: &str,
        url: Option<&str>,
    ) -> sqlx::Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "insert into notifications(user_id, message, url) values ($1, $2, $3) returning id",
        )
        .bind(user_id)
        .bind(message)
        .bind(url)
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "List notifications for a user", skip(executor))]
    pub async fn fetch_for_user<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> sqlx::Result<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "select id, user_id, message, url, is_read, created_at \
             from notifications where user_id = $1 order by created_at desc",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Mark notifications read", skip(executor))]
    pub async fn mark_all_read<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> sqlx::Result<u64> {
        let result =
            sqlx::query("update notifications set is_read = true where user_id = $1 and not is_read")
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
