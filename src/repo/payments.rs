use chrono::{DateTime, Duration, Utc};

use serde::Serialize;

use sqlx::{FromRow, PgConnection};

use uuid::Uuid;

use crate::repo::CourseRepo;

#[derive(Debug)]
pub struct NewPayment {
    pub course_id: Uuid,
    pub provider_id: Uuid,
    pub plan_id: Uuid,
    pub paid_amount: i64,
    /// Explicit validity boundary; defaults to start + plan duration
    pub end_date: Option<DateTime<Utc>>,
}

/// Append-only evidence of a paid listing window; never mutated or deleted
#[derive(Debug, FromRow, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub provider_id: Uuid,
    pub plan_id: Uuid,
    pub paid_amount: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

pub struct PaymentsRepo;

impl PaymentsRepo {
    /// Persist a payment and refresh the owning course's projection in the
    /// same unit of work.
    ///
    /// The recompute is an explicit call here rather than a storage-side
    /// hook; callers must run this inside a transaction so the payment row
    /// and the refreshed course commit together or not at all.
    #[tracing::instrument(name = "Record a course payment", skip(conn))]
    pub async fn record(
        conn: &mut PgConnection,
        new_payment: &NewPayment,
        plan_duration_days: i32,
    ) -> sqlx::Result<Payment> {
        let now = Utc::now();
        let end_date = new_payment
            .end_date
            .unwrap_or_else(|| now + Duration::days(plan_duration_days as i64));

        let payment = sqlx::query_as::<_, Payment>(
            "insert into course_payments(course_id, provider_id, plan_id, paid_amount, end_date) \
             values ($1, $2, $3, $4, $5) \
             returning id, course_id, provider_id, plan_id, paid_amount, start_date, end_date, \
                       is_active",
        )
        .bind(new_payment.course_id)
        .bind(new_payment.provider_id)
        .bind(new_payment.plan_id)
        .bind(new_payment.paid_amount)
        .bind(end_date)
        .fetch_one(&mut *conn)
        .await?;

        CourseRepo::recompute_status(conn, new_payment.course_id, now).await?;

        Ok(payment)
    }
}
