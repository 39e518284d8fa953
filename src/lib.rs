//! Intake - survey submission service
//!
//! Accepts onboarding-survey submissions over JSON/HTTP, persists each
//! one alongside a derived tag set in MongoDB, and propagates the
//! exportable tags to the Kit email-marketing API.
//!
//! ## Pipeline
//!
//! validate -> resolve identity -> append response record -> upsert
//! tags -> sync to Kit -> record sync outcome. Failures before the
//! durable response write surface to the caller; everything after is
//! absorbed and reflected only in status fields, so a Kit outage never
//! loses an already-saved submission.

pub mod catalog;
pub mod config;
pub mod db;
pub mod orchestrator;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod store;
pub mod sync;
pub mod types;
pub mod validator;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{IntakeError, Result};
