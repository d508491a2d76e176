use serde::Serialize;

use sqlx::{FromRow, PgConnection};

use uuid::Uuid;

use crate::domain::PlanQuote;

/// Purchasable listing tier; read-mostly reference data keyed by duration
#[derive(Debug, FromRow, Serialize)]
pub struct ListingPlan {
    pub id: Uuid,
    pub name: String,
    pub duration_days: i32,
    pub price: i64,
    pub is_featured: bool,
}

pub struct PlanRepo;

impl PlanRepo {
    /// Look up the plan for a duration, creating it from the quote on first
    /// use. The unique constraint on `duration_days` makes this safe under
    /// concurrent checkouts: the insert loses the race, the follow-up select
    /// finds the winner's row.
    #[tracing::instrument(name = "Get or create a listing plan", skip(conn))]
    pub async fn get_or_create(
        conn: &mut PgConnection,
        quote: &PlanQuote,
    ) -> sqlx::Result<ListingPlan> {
        let inserted = sqlx::query_as::<_, ListingPlan>(
            "insert into listing_plans(name, duration_days, price, is_featured) \
             values ($1, $2, $3, $4) \
             on conflict (duration_days) do nothing \
             returning id, name, duration_days, price, is_featured",
        )
        .bind(quote.name)
        .bind(quote.duration_days)
        .bind(quote.price)
        .bind(quote.is_featured)
        .fetch_optional(&mut *conn)
        .await?;

        match inserted {
            Some(plan) => Ok(plan),
            None => {
                sqlx::query_as::<_, ListingPlan>(
                    "select id, name, duration_days, price, is_featured \
                     from listing_plans where duration_days = $1",
                )
                .bind(quote.duration_days)
                .fetch_one(conn)
                .await
            }
        }
    }
}
