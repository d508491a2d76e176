mod conversations;
mod courses;
mod notifications;
mod payments;
mod plans;
mod users;

pub use conversations::{ConversationSummary, ConversationsRepo, Message, MessagesRepo};
pub use courses::{Course, CourseRepo, NewCourse};
pub use notifications::{Notification, NotificationsRepo};
pub use payments::{NewPayment, Payment, PaymentsRepo};
pub use plans::{ListingPlan, PlanRepo};
pub use users::{NewUser, User, UserCredentials, UsersRepo};
