//! Survey response document schema
//!
//! One record per submission, append-only. The answer content is
//! immutable once written; only `sync_status`, `synced_at` and
//! `metadata.updated_at` mutate later. Records are never deleted.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::validator::SurveyAnswers;

/// Default collection name for survey responses
pub const RESPONSE_COLLECTION: &str = "survey_responses";

/// Outcome of propagating tags to Kit, stored per response
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        }
    }
}

/// Survey response document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SurveyResponseDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Generated unique response identifier (UUID v4)
    pub response_id: String,

    /// Case-normalized email, the identity key
    pub email: String,

    pub name: String,

    /// Subscriber record this response links to (ObjectId hex)
    pub subscriber_id: String,

    /// Full original answer set
    pub answers: SurveyAnswers,

    /// Client-computed recommendation list
    pub recommendations: Vec<String>,

    /// Flattened tag list
    pub tags: Vec<String>,

    /// Free text for prof_other; stored locally, never exported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession_other: Option<String>,

    /// Free text for mod_other; stored locally, never exported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_other: Option<String>,

    #[serde(default)]
    pub sync_status: SyncStatus,

    /// When the external sync succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime>,

    pub completed: bool,

    pub submitted_at: DateTime,
}

// bson::DateTime has no Default impl, so the required Default for the
// collection wrapper is written out
impl Default for SurveyResponseDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            response_id: String::new(),
            email: String::new(),
            name: String::new(),
            subscriber_id: String::new(),
            answers: SurveyAnswers::default(),
            recommendations: Vec::new(),
            tags: Vec::new(),
            profession_other: None,
            modality_other: None,
            sync_status: SyncStatus::Pending,
            synced_at: None,
            completed: false,
            submitted_at: DateTime::from_millis(0),
        }
    }
}

impl IntoIndexes for SurveyResponseDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "response_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("response_id_unique".to_string())
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
            // The out-of-band retry process scans for failed syncs
            (
                doc! { "sync_status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("sync_status_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SurveyResponseDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
