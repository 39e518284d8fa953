//! Subscriber document schema
//!
//! The identity record submissions and tags link to. The pipeline reads
//! it by email; the only write this service performs is creating a
//! minimal stub when no record exists yet.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Default collection name for subscribers
pub const SUBSCRIBER_COLLECTION: &str = "subscribers";

/// Status marker for stub records created by this service
pub const SUBSCRIBER_STATUS_STUB: &str = "stub";

/// Subscriber document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SubscriberDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Case-normalized email, unique
    pub email: String,

    pub name: String,

    /// "active" for records owned by the subscriber system, "stub" for
    /// minimal records created here
    pub status: String,
}

impl SubscriberDoc {
    /// Create a minimal stub record
    pub fn stub(name: String, email: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            email,
            name,
            status: SUBSCRIBER_STATUS_STUB.to_string(),
        }
    }
}

impl IntoIndexes for SubscriberDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for SubscriberDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
