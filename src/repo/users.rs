use secrecy::Secret;

use sqlx::{FromRow, PgExecutor};

use uuid::Uuid;

use crate::domain::{EmailAddress, PersonName, UserRole};

#[derive(Debug)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
    pub display_name: PersonName,
    pub role: UserRole,
}

#[derive(Debug)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: Secret<String>,
}

#[derive(Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub user_type: String,
}

pub struct UsersRepo;

impl UsersRepo {
    #[tracing::instrument(name = "Insert a new user record", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_user: &NewUser,
    ) -> sqlx::Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "insert into users(email, password_hash, display_name, user_type)
             values ($1, $2, $3, $4) returning id",
        )
        .bind(new_user.email.as_ref())
        .bind(&new_user.password_hash)
        .bind(new_user.display_name.as_ref())
        .bind(new_user.role.as_str())
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch user credentials by email", skip(executor))]
    pub async fn fetch_credentials_by_email<'con>(
        executor: impl PgExecutor<'con>,
        email: &EmailAddress,
    ) -> sqlx::Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            "select id, password_hash from users where email = $1",
        )
        .bind(email.as_ref())
        .fetch_optional(executor)
        .await?;

        Ok(row.map(|(id, password_hash)| UserCredentials {
            id,
            password_hash: Secret::new(password_hash),
        }))
    }

    #[tracing::instrument(name = "Fetch a user by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "select id, email, display_name, user_type from users where id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
