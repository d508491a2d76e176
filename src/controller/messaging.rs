use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::suggest_reply;
use crate::error::{RestError, RestResult};
use crate::repo::{ConversationsRepo, MessagesRepo, NotificationsRepo, UsersRepo};

#[derive(Debug, Deserialize)]
pub struct StartConversationBody {
    user_id: Uuid,
}

#[derive(Debug, Serialize)]
struct ConversationStarted {
    conversation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct NewMessageBody {
    content: String,
}

#[derive(Debug, Serialize)]
struct SuggestedReply {
    reply: String,
}

/// Find or create the direct conversation between the caller and another user
#[tracing::instrument(name = "Start a conversation", skip(pool))]
#[post("/conversations")]
async fn start_conversation(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    body: web::Json<StartConversationBody>,
) -> RestResult<impl Responder> {
    if body.user_id == user.id {
        return Err(RestError::ParseError(
            "Cannot start a conversation with yourself".into(),
        ));
    }

    UsersRepo::fetch_by_id(pool.get_ref(), body.user_id)
        .await?
        .ok_or_else(|| RestError::NotFound("User not found".into()))?;

    if let Some(conversation_id) =
        ConversationsRepo::find_direct(pool.get_ref(), user.id, body.user_id).await?
    {
        return Ok(HttpResponse::Ok().json(ConversationStarted { conversation_id }));
    }

    let mut tx = pool.begin().await?;
    let conversation_id = ConversationsRepo::create_direct(&mut tx, user.id, body.user_id).await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(ConversationStarted { conversation_id }))
}

/// Inbox: the caller's conversations, most recently updated first
#[tracing::instrument(name = "List conversations", skip(pool))]
#[get("/conversations")]
async fn inbox(user: AuthenticatedUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let conversations = ConversationsRepo::fetch_for_user(pool.get_ref(), user.id).await?;

    Ok(web::Json(conversations))
}

/// Chronological transcript of one conversation, participants only
#[tracing::instrument(name = "List messages", skip(pool))]
#[get("/conversations/{conversation_id}/messages")]
async fn transcript(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (conversation_id,) = path.into_inner();

    if !ConversationsRepo::is_participant(pool.get_ref(), conversation_id, user.id).await? {
        return Err(RestError::Forbidden(
            "Not a participant of this conversation".into(),
        ));
    }

    let messages = MessagesRepo::list(pool.get_ref(), conversation_id).await?;

    Ok(web::Json(messages))
}

/// Post a message and fan out a notification to every other participant.
/// The message, the conversation bump, and the notifications commit together.
#[tracing::instrument(name = "Send a message", skip(pool, body))]
#[post("/conversations/{conversation_id}/messages")]
async fn send_message(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
    body: web::Json<NewMessageBody>,
) -> RestResult<impl Responder> {
    let (conversation_id,) = path.into_inner();

    if body.content.trim().is_empty() {
        return Err(RestError::ParseError("Message cannot be empty".into()));
    }

    let mut tx = pool.begin().await?;

    if !ConversationsRepo::is_participant(&mut *tx, conversation_id, user.id).await? {
        return Err(RestError::Forbidden(
            "Not a participant of this conversation".into(),
        ));
    }

    MessagesRepo::insert(&mut *tx, conversation_id, user.id, body.content.trim()).await?;
    ConversationsRepo::touch(&mut *tx, conversation_id).await?;

    let note = format!("New message from {}", user.display_name);
    let url = format!("/messaging/conversations/{}", conversation_id);
    for recipient in ConversationsRepo::participants_except(&mut *tx, conversation_id, user.id).await?
    {
        NotificationsRepo::insert(&mut *tx, recipient, &note, Some(&url)).await?;
    }

    tx.commit().await?;

    Ok(HttpResponse::Created())
}

/// Canned reply based on the caller's role and the last received message
#[tracing::instrument(name = "Suggest a reply", skip(pool))]
#[get("/conversations/{conversation_id}/suggested_reply")]
async fn suggested_reply(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (conversation_id,) = path.into_inner();
    let pool = pool.get_ref();

    if !ConversationsRepo::is_participant(pool, conversation_id, user.id).await? {
        return Err(RestError::Forbidden(
            "Not a participant of this conversation".into(),
        ));
    }

    let other_id = ConversationsRepo::participants_except(pool, conversation_id, user.id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| RestError::NotFound("No other participant".into()))?;
    let other = UsersRepo::fetch_by_id(pool, other_id)
        .await?
        .ok_or_else(|| RestError::NotFound("User not found".into()))?;

    let last_received = MessagesRepo::last_received(pool, conversation_id, user.id).await?;

    let reply = suggest_reply(
        user.role,
        &other.display_name,
        last_received.as_ref().map(|m| m.content.as_str()),
    );

    Ok(web::Json(SuggestedReply { reply }))
}

/// Notifications feed; reading it marks everything as read
#[tracing::instrument(name = "List notifications", skip(pool))]
#[get("/notifications")]
async fn notifications(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let mut tx = pool.begin().await?;
    let notes = NotificationsRepo::fetch_for_user(&mut *tx, user.id).await?;
    NotificationsRepo::mark_all_read(&mut *tx, user.id).await?;
    tx.commit().await?;

    Ok(web::Json(notes))
}

/// Messaging API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/messaging")
        .service(start_conversation)
        .service(inbox)
        .service(transcript)
        .service(send_message)
        .service(suggested_reply)
        .service(notifications)
}
