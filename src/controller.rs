pub mod courses;
pub mod messaging;
pub mod provider;
