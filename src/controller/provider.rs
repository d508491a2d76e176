use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, Responder};

use chrono::Utc;

use serde::Serialize;

use sqlx::PgPool;

use crate::auth::AuthenticatedUser;
use crate::error::RestResult;
use crate::repo::{Course, CourseRepo};

#[derive(Debug, Serialize)]
struct Dashboard {
    total_courses: usize,
    active_courses: usize,
    expired_courses: usize,
    courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
struct SweepOutcome {
    deactivated: u64,
}

/// Provider stats and management view.
///
/// Expiry is checked lazily: each dashboard read sweeps expired courses
/// before reporting, so a course can show as active for at most the window
/// between reads.
#[tracing::instrument(name = "Provider dashboard", skip(pool))]
#[get("/dashboard")]
async fn dashboard(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let today = Utc::now().date_naive();
    CourseRepo::sweep_expired(pool.get_ref(), today).await?;

    let courses = CourseRepo::list_by_provider(pool.get_ref(), user.id).await?;

    let total_courses = courses.len();
    let active_courses = courses.iter().filter(|c| c.is_active).count();
    let expired_courses = total_courses - active_courses;

    Ok(web::Json(Dashboard {
        total_courses,
        active_courses,
        expired_courses,
        courses,
    }))
}

/// Maintenance entry point mirroring the dashboard's lazy sweep, for
/// periodic invocation
#[tracing::instrument(name = "Sweep expired courses", skip(pool))]
#[post("/sweep")]
async fn sweep(_user: AuthenticatedUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let today = Utc::now().date_naive();
    let deactivated = CourseRepo::sweep_expired(pool.get_ref(), today).await?;

    if deactivated > 0 {
        tracing::info!("Deactivated {} expired courses", deactivated);
    }

    Ok(web::Json(SweepOutcome { deactivated }))
}

/// Provider API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/provider").service(dashboard).service(sweep)
}
