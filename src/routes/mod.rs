//! HTTP routes

pub mod health;
pub mod submission;

pub use health::{health_check, version_info};
pub use submission::handle_submission;
