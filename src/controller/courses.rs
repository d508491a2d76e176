use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use chrono::Utc;

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use url::Url;

use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::PlanQuote;
use crate::error::{RestError, RestResult};
use crate::repo::{Course, CourseRepo, NewCourse, NewPayment, Payment, PaymentsRepo, PlanRepo};

/// Form deserialization wrapper for parsing new course submissions
#[derive(Debug, Deserialize)]
pub struct NewCourseForm {
    title: String,
    description: String,
    instructor: String,
    /// Human-readable duration label; not authoritative for expiry
    duration: String,
    external_link: Option<String>,
}

impl NewCourseForm {
    fn into_new_course(self, provider_id: Uuid) -> Result<NewCourse, String> {
        let title = self.title.parse()?;
        let instructor = self.instructor.parse()?;
        let external_link = match self.external_link.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(Url::parse(raw).map_err(|e| format!("external link: {}", e))?),
        };

        Ok(NewCourse {
            provider_id,
            title,
            description: self.description,
            instructor,
            duration_text: self.duration,
            // Listing duration comes from the paid plan, not the form
            duration_days: 0,
            external_link,
        })
    }
}

#[derive(Debug, Serialize)]
struct CourseCreated {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    plan_days: i32,
}

/// Upper bound on a client-chosen listing window; keeps date arithmetic
/// well away from chrono's overflow panic
const MAX_PLAN_DAYS: i32 = 365;

#[derive(Debug, Serialize)]
struct CheckoutReceipt {
    payment: Payment,
    course: Course,
}

/// Public listing of active, unexpired courses, newest first
#[tracing::instrument(name = "List active courses", skip(pool))]
#[get("")]
async fn list(pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let today = Utc::now().date_naive();
    let courses = CourseRepo::list_active(pool.get_ref(), today).await?;

    Ok(web::Json(courses))
}

/// Create endpoint for new course listings; the course starts inactive and
/// is only listed once a checkout activates it
#[tracing::instrument(name = "Create a new course", skip(pool))]
#[post("")]
async fn create(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    form: web::Form<NewCourseForm>,
) -> RestResult<impl Responder> {
    let new_course = form
        .into_inner()
        .into_new_course(user.id)
        .map_err(RestError::ParseError)?;

    let id = CourseRepo::insert(pool.get_ref(), &new_course).await?;

    Ok(HttpResponse::Created().json(CourseCreated { id }))
}

/// Mock payment gateway checkout: resolve the plan from the duration table,
/// append a payment record, and refresh the course projection, all in one
/// transaction.
#[tracing::instrument(name = "Checkout a course listing", skip(pool))]
#[post("/{course_id}/checkout")]
async fn checkout(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
    body: web::Json<CheckoutBody>,
) -> RestResult<impl Responder> {
    let (course_id,) = path.into_inner();

    if body.plan_days <= 0 || body.plan_days > MAX_PLAN_DAYS {
        return Err(RestError::ParseError(format!(
            "Plan duration must be between 1 and {} days",
            MAX_PLAN_DAYS
        )));
    }

    let quote = PlanQuote::for_duration(body.plan_days);

    let mut tx = pool.begin().await?;

    let course = CourseRepo::fetch_by_id(&mut *tx, course_id)
        .await?
        .ok_or_else(|| RestError::NotFound("Course not found".into()))?;
    if course.provider_id != user.id {
        // Authorization failure, checked before any payment row exists
        return Err(RestError::Forbidden(
            "You cannot pay for a course you do not own".into(),
        ));
    }

    let plan = PlanRepo::get_or_create(&mut tx, &quote).await?;
    let payment = PaymentsRepo::record(
        &mut tx,
        &NewPayment {
            course_id,
            provider_id: user.id,
            plan_id: plan.id,
            paid_amount: quote.price,
            end_date: None,
        },
        plan.duration_days,
    )
    .await?;

    let course = CourseRepo::fetch_by_id(&mut *tx, course_id)
        .await?
        .ok_or_else(|| RestError::InternalError("Course vanished during checkout".into()))?;

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(CheckoutReceipt { payment, course }))
}

/// Course API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/courses")
        .service(list)
        .service(create)
        .service(checkout)
}
