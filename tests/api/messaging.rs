use reqwest::StatusCode;

use serde_json::Value;

use sqlx::PgPool;

use uuid::Uuid;

use skillbridge::domain::UserRole;

use crate::helpers::{TestApp, TestUser};

async fn start_conversation(app: &TestApp, from: &TestUser, to: &TestUser) -> Uuid {
    let res = app
        .start_conversation(Some(&from.credentials()), to.id)
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());

    let body: Value = res.json().await.expect("Failed to parse response body");
    body["conversation_id"]
        .as_str()
        .expect("Missing conversation id")
        .parse()
        .expect("Invalid conversation id")
}

#[sqlx::test]
async fn starting_a_conversation_twice_reuses_it(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;

    let first = start_conversation(&app, &seeker, &recruiter).await;
    // Same conversation from the other side
    let second = start_conversation(&app, &recruiter, &seeker).await;

    assert_eq!(first, second);

    Ok(())
}

#[sqlx::test]
async fn sending_a_message_notifies_the_other_participant(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    let res = app
        .send_message(Some(&seeker.credentials()), conversation, "Hello there")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let res = app
        .notifications(Some(&recruiter.credentials()))
        .await
        .expect("Failed to execute request");
    let notes: Vec<Value> = res.json().await.expect("Failed to parse response body");
    assert_eq!(1, notes.len());
    assert_eq!(
        Some("New message from Seeker"),
        notes[0]["message"].as_str()
    );

    // The sender gets no notification for their own message
    let res = app
        .notifications(Some(&seeker.credentials()))
        .await
        .expect("Failed to execute request");
    let notes: Vec<Value> = res.json().await.expect("Failed to parse response body");
    assert!(notes.is_empty());

    Ok(())
}

#[sqlx::test]
async fn reading_notifications_marks_them_read(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    app.send_message(Some(&seeker.credentials()), conversation, "Hello there")
        .await
        .expect("Failed to execute request");

    app.notifications(Some(&recruiter.credentials()))
        .await
        .expect("Failed to execute request");

    let unread: i64 = sqlx::query_scalar(
        "select count(*) from notifications where user_id = $1 and not is_read",
    )
    .bind(recruiter.id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(0, unread);

    Ok(())
}

#[sqlx::test]
async fn non_participants_cannot_post_or_read(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let outsider =
        TestUser::register(&pool, "outsider@test.com", "Outsider", UserRole::JobSeeker).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    let res = app
        .send_message(Some(&outsider.credentials()), conversation, "Let me in")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .suggested_reply(Some(&outsider.credentials()), conversation)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .transcript(Some(&outsider.credentials()), conversation)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    Ok(())
}

#[sqlx::test]
async fn suggested_reply_matches_availability_keywords(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    app.send_message(
        Some(&recruiter.credentials()),
        conversation,
        "When are you available for a discussion?",
    )
    .await
    .expect("Failed to execute request");

    let res = app
        .suggested_reply(Some(&seeker.credentials()), conversation)
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());

    let body: Value = res.json().await.expect("Failed to parse response body");
    let reply = body["reply"].as_str().expect("Missing reply");
    assert!(reply.contains("Tuesday or Thursday afternoon"));
    assert!(reply.contains("Recruiter"));

    Ok(())
}

#[sqlx::test]
async fn recruiters_always_get_the_recruiter_template(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    app.send_message(
        Some(&seeker.credentials()),
        conversation,
        "When can we schedule a call?",
    )
    .await
    .expect("Failed to execute request");

    let res = app
        .suggested_reply(Some(&recruiter.credentials()), conversation)
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse response body");
    let reply = body["reply"].as_str().expect("Missing reply");
    assert!(reply.contains("Thank you for your application"));

    Ok(())
}

#[sqlx::test]
async fn inbox_lists_conversations_with_last_message(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let seeker = TestUser::register(&pool, "seeker@test.com", "Seeker", UserRole::JobSeeker).await;
    let recruiter =
        TestUser::register(&pool, "recruiter@test.com", "Recruiter", UserRole::Recruiter).await;
    let conversation = start_conversation(&app, &seeker, &recruiter).await;

    app.send_message(Some(&recruiter.credentials()), conversation, "Hello Seeker")
        .await
        .expect("Failed to execute request");

    let res = app
        .inbox(Some(&seeker.credentials()))
        .await
        .expect("Failed to execute request");
    let inbox: Vec<Value> = res.json().await.expect("Failed to parse response body");

    assert_eq!(1, inbox.len());
    assert_eq!(Some("Recruiter"), inbox[0]["other_user_name"].as_str());
    assert_eq!(Some("Hello Seeker"), inbox[0]["last_message"].as_str());

    Ok(())
}
