//! Subscriber tag document schema
//!
//! Current-state projection keyed by (email, tag), not an accumulating
//! log. Re-upserting an existing pair refreshes `metadata.updated_at`
//! and never creates a duplicate; the unique compound index enforces
//! that even under concurrent upserts.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Default collection name for subscriber tags
pub const TAG_COLLECTION: &str = "subscriber_tags";

/// Where a tag record came from
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    #[default]
    Survey,
    Manual,
    Import,
}

impl TagSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagSource::Survey => "survey",
            TagSource::Manual => "manual",
            TagSource::Import => "import",
        }
    }
}

/// Subscriber tag document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TagDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Case-normalized email, half of the identity key
    pub email: String,

    /// Tag name, the other half of the identity key
    pub tag: String,

    #[serde(default)]
    pub source: TagSource,

    /// Subscriber record this tag links to (ObjectId hex)
    pub subscriber_id: String,
}

impl IntoIndexes for TagDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "email": 1, "tag": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_tag_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .name("email_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for TagDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
