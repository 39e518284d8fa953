//! Document schemas

pub mod metadata;
pub mod subscriber;
pub mod survey_response;
pub mod tag;

pub use metadata::Metadata;
pub use subscriber::{SubscriberDoc, SUBSCRIBER_COLLECTION, SUBSCRIBER_STATUS_STUB};
pub use survey_response::{SurveyResponseDoc, SyncStatus, RESPONSE_COLLECTION};
pub use tag::{TagDoc, TagSource, TAG_COLLECTION};
