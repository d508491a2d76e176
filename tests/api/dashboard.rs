use chrono::{Duration, NaiveDate, Utc};

use reqwest::StatusCode;

use serde_json::Value;

use sqlx::PgPool;

use uuid::Uuid;

use skillbridge::domain::UserRole;

use crate::helpers::{Credentials, NewCourseForm, TestApp, TestUser};

async fn create_paid_course(app: &TestApp, creds: &Credentials, plan_days: i32) -> Uuid {
    let res = app
        .course_create(Some(creds), &NewCourseForm::valid())
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse response body");
    let course_id: Uuid = body["id"]
        .as_str()
        .expect("Missing course id")
        .parse()
        .expect("Invalid course id");

    let res = app
        .course_checkout(Some(creds), course_id, plan_days)
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());

    course_id
}

async fn backdate_expiry(pool: &PgPool, course_id: Uuid, expires_on: NaiveDate) {
    sqlx::query("update courses set expires_on = $2 where id = $1")
        .bind(course_id)
        .bind(expires_on)
        .execute(pool)
        .await
        .expect("Failed to backdate expiry");
}

#[sqlx::test]
async fn dashboard_requires_authentication(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .provider_dashboard(None)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn dashboard_sweeps_expired_courses_on_read(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let provider = TestUser::register(&pool, "provider@test.com", "Provider", UserRole::Recruiter).await;
    let creds = provider.credentials();

    let expired = create_paid_course(&app, &creds, 7).await;
    let current = create_paid_course(&app, &creds, 30).await;

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    backdate_expiry(&pool, expired, yesterday).await;

    let res = app
        .provider_dashboard(Some(&creds))
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());

    let body: Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(Some(2), body["total_courses"].as_u64());
    assert_eq!(Some(1), body["active_courses"].as_u64());
    assert_eq!(Some(1), body["expired_courses"].as_u64());

    // The sweep flips the flag but keeps the expiry date
    let (is_active, expires_on): (bool, Option<NaiveDate>) =
        sqlx::query_as("select is_active, expires_on from courses where id = $1")
            .bind(expired)
            .fetch_one(&pool)
            .await?;
    assert!(!is_active);
    assert_eq!(Some(yesterday), expires_on);

    let is_active: bool = sqlx::query_scalar("select is_active from courses where id = $1")
        .bind(current)
        .fetch_one(&pool)
        .await?;
    assert!(is_active);

    Ok(())
}

#[sqlx::test]
async fn sweep_endpoint_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let provider = TestUser::register(&pool, "provider@test.com", "Provider", UserRole::Recruiter).await;
    let creds = provider.credentials();

    let course_id = create_paid_course(&app, &creds, 7).await;
    backdate_expiry(&pool, course_id, (Utc::now() - Duration::days(1)).date_naive()).await;

    let res = app
        .provider_sweep(Some(&creds))
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(Some(1), body["deactivated"].as_u64());

    let res = app
        .provider_sweep(Some(&creds))
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse response body");
    assert_eq!(Some(0), body["deactivated"].as_u64());

    Ok(())
}
