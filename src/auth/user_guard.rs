use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};

use secrecy::ExposeSecret;

use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::{EmailAddress, UserRole};
use crate::error::RestError;
use crate::repo::UsersRepo;

/// Request guard resolving Basic credentials to a stored user account.
///
/// Every identity-bearing endpoint authenticates per-request; there is no
/// session state.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub display_name: String,
    pub role: UserRole,
}

impl FromRequest for AuthenticatedUser {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .ok_or_else(|| RestError::InternalError("Database pool not configured".into()))?
                .clone();

            let credentials = crate::auth::Credentials::from_headers(req.headers())
                .map_err(|e| RestError::Unauthorized(e.to_string()))?;

            authenticate(&pool, credentials).await
        })
    }
}

#[tracing::instrument(name = "Authenticate request credentials", skip(pool, credentials))]
async fn authenticate(
    pool: &PgPool,
    credentials: crate::auth::Credentials,
) -> Result<AuthenticatedUser, RestError> {
    let email: EmailAddress = credentials
        .email
        .parse()
        .map_err(|_| RestError::Unauthorized("Invalid email".into()))?;

    let stored = UsersRepo::fetch_credentials_by_email(pool, &email)
        .await?
        .ok_or_else(|| RestError::Unauthorized("Unknown email".into()))?;

    let parsed_hash = PasswordHash::new(stored.password_hash.expose_secret())
        .map_err(|_| RestError::InternalError("Malformed stored password hash".into()))?;

    Argon2::default()
        .verify_password(credentials.password.expose_secret().as_bytes(), &parsed_hash)
        .map_err(|_| RestError::Unauthorized("Invalid password".into()))?;

    let user = UsersRepo::fetch_by_id(pool, stored.id)
        .await?
        .ok_or_else(|| RestError::Unauthorized("Unknown user".into()))?;

    let role: UserRole = user
        .user_type
        .parse()
        .map_err(|_| RestError::InternalError("Unknown stored user role".into()))?;

    Ok(AuthenticatedUser {
        id: user.id,
        display_name: user.display_name,
        role,
    })
}
