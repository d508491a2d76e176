use chrono::{DateTime, NaiveDate, Utc};

use serde::Serialize;

use sqlx::{FromRow, PgConnection, PgExecutor};

use url::Url;

use uuid::Uuid;

use crate::domain::{CourseTitle, PersonName};

/// A course as submitted by its provider, before any payment exists
#[derive(Debug)]
pub struct NewCourse {
    pub provider_id: Uuid,
    pub title: CourseTitle,
    pub description: String,
    pub instructor: PersonName,
    pub duration_text: String,
    pub duration_days: i32,
    pub external_link: Option<Url>,
}

/// Stored course record.
///
/// `is_active` and `expires_on` are a cached projection of the payment
/// ledger; they are only ever written by `recompute_status` and
/// `sweep_expired`.
#[derive(Debug, FromRow, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration_text: String,
    pub duration_days: i32,
    pub external_link: Option<String>,
    pub is_active: bool,
    pub expires_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

const COURSE_COLUMNS: &str = "id, provider_id, title, description, instructor, duration_text, \
                              duration_days, external_link, is_active, expires_on, created_at";

pub struct CourseRepo;

impl CourseRepo {
    #[tracing::instrument(name = "Insert a new course", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_course: &NewCourse,
    ) -> sqlx::Result<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "insert into courses(provider_id, title, description, instructor, duration_text, \
             duration_days, external_link) \
             values ($1, $2, $3, $4, $5, $6, $7) returning id",
        )
        .bind(new_course.provider_id)
        .bind(new_course.title.as_ref())
        .bind(&new_course.description)
        .bind(new_course.instructor.as_ref())
        .bind(&new_course.duration_text)
        .bind(new_course.duration_days)
        .bind(new_course.external_link.as_ref().map(Url::as_str))
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch a course by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Course>> {
        sqlx::query_as::<_, Course>(&format!(
            "select {} from courses where id = $1",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Publicly listed courses: active and not yet expired, newest first
    #[tracing::instrument(name = "List active courses", skip(executor))]
    pub async fn list_active<'con>(
        executor: impl PgExecutor<'con>,
        today: NaiveDate,
    ) -> sqlx::Result<Vec<Course>> {
        sqlx::query_as::<_, Course>(&format!(
            "select {} from courses where is_active and expires_on >= $1 \
             order by created_at desc",
            COURSE_COLUMNS
        ))
        .bind(today)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "List courses for a provider", skip(executor))]
    pub async fn list_by_provider<'con>(
        executor: impl PgExecutor<'con>,
        provider_id: Uuid,
    ) -> sqlx::Result<Vec<Course>> {
        sqlx::query_as::<_, Course>(&format!(
            "select {} from courses where provider_id = $1 order by created_at desc",
            COURSE_COLUMNS
        ))
        .bind(provider_id)
        .fetch_all(executor)
        .await
    }

    /// Re-derive `is_active`/`expires_on` from the payment ledger.
    ///
    /// The winning record is the active, unexpired payment with the latest
    /// end date; with overlapping payments the one with the most remaining
    /// validity wins. When no payment qualifies the course goes inactive and
    /// `expires_on` keeps its last value.
    #[tracing::instrument(name = "Recompute course status", skip(conn))]
    pub async fn recompute_status(
        conn: &mut PgConnection,
        course_id: Uuid,
        now: DateTime<Utc>,
    ) -> sqlx::Result<()> {
        let valid_until = sqlx::query_scalar::<_, DateTime<Utc>>(
            "select end_date from course_payments \
             where course_id = $1 and is_active and end_date >= $2 \
             order by end_date desc limit 1",
        )
        .bind(course_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        match valid_until {
            Some(end_date) => {
                sqlx::query("update courses set is_active = true, expires_on = $2 where id = $1")
                    .bind(course_id)
                    .bind(end_date.date_naive())
                    .execute(conn)
                    .await?;
            }
            None => {
                sqlx::query("update courses set is_active = false where id = $1")
                    .bind(course_id)
                    .execute(conn)
                    .await?;
            }
        }

        Ok(())
    }

    /// Deactivate every course whose expiry date has passed.
    ///
    /// One bulk update; idempotent, so it is safe to run on every dashboard
    /// read as well as from a periodic maintenance call. Returns the number
    /// of courses deactivated.
    #[tracing::instrument(name = "Sweep expired courses", skip(executor))]
    pub async fn sweep_expired<'con>(
        executor: impl PgExecutor<'con>,
        today: NaiveDate,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query("update courses set is_active = false \
                                  where is_active and expires_on < $1")
            .bind(today)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
