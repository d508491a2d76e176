mod course_title;
mod email_address;
mod person_name;
mod plan_quote;
mod reply;
mod user_role;

pub use course_title::CourseTitle;
pub use email_address::EmailAddress;
pub use person_name::PersonName;
pub use plan_quote::PlanQuote;
pub use reply::suggest_reply;
pub use user_role::UserRole;
