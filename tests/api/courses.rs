use reqwest::StatusCode;

use sqlx::PgPool;

use serde_json::Value;

use skillbridge::domain::UserRole;

use crate::helpers::{NewCourseForm, TestApp, TestUser};

#[sqlx::test]
async fn create_returns_created_and_course_starts_inactive(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let provider = TestUser::register(&pool, "provider@test.com", "Provider", UserRole::Recruiter).await;

    let res = app
        .course_create(Some(&provider.credentials()), &NewCourseForm::valid())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CREATED, res.status());

    let body: Value = res.json().await.expect("Failed to parse response body");
    let id = body["id"].as_str().expect("Missing course id");

    let (is_active, expires_on): (bool, Option<chrono::NaiveDate>) =
        sqlx::query_as("select is_active, expires_on from courses where id = $1::uuid")
            .bind(id)
            .fetch_one(&pool)
            .await?;

    assert!(!is_active);
    assert!(expires_on.is_none());

    Ok(())
}

#[sqlx::test]
async fn create_requires_authentication(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .course_create(None, &NewCourseForm::valid())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn create_rejects_invalid_fields(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let provider = TestUser::register(&pool, "provider@test.com", "Provider", UserRole::Recruiter).await;

    let test_cases = vec![
        NewCourseForm {
            title: Some("".into()),
            ..NewCourseForm::valid()
        },
        NewCourseForm {
            title: Some("Rust for <script>everyone</script>".into()),
            ..NewCourseForm::valid()
        },
        NewCourseForm {
            external_link: Some("not a url".into()),
            ..NewCourseForm::valid()
        },
    ];

    for form in test_cases {
        let res = app
            .course_create(Some(&provider.credentials()), &form)
            .await
            .expect("Failed to execute request");

        assert_eq!(StatusCode::BAD_REQUEST, res.status());
    }

    Ok(())
}

#[sqlx::test]
async fn listing_only_shows_paid_up_courses(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let provider = TestUser::register(&pool, "provider@test.com", "Provider", UserRole::Recruiter).await;
    let creds = provider.credentials();

    // Unpaid course: never listed
    app.course_create(Some(&creds), &NewCourseForm::valid())
        .await
        .expect("Failed to execute request");

    let res = app.course_list().await.expect("Failed to execute request");
    let listed: Vec<Value> = res.json().await.expect("Failed to parse response body");
    assert!(listed.is_empty());

    // Paid course: listed
    let res = app
        .course_create(Some(&creds), &NewCourseForm::valid())
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse response body");
    let id: uuid::Uuid = body["id"]
        .as_str()
        .expect("Missing course id")
        .parse()
        .expect("Invalid course id");

    let res = app
        .course_checkout(Some(&creds), id, 30)
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());

    let res = app.course_list().await.expect("Failed to execute request");
    let listed: Vec<Value> = res.json().await.expect("Failed to parse response body");
    assert_eq!(1, listed.len());
    assert_eq!(id.to_string(), listed[0]["id"].as_str().unwrap());

    Ok(())
}
