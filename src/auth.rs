mod credentials;
mod user_guard;

pub use credentials::Credentials;
pub use user_guard::AuthenticatedUser;
