//! Durable stores
//!
//! Trait seams over MongoDB so the orchestrator takes its collaborators
//! by injection: the audit-trail response store, the current-state tag
//! store, and the subscriber identity lookup. Constructed explicitly at
//! process start, never lazily from module state.

pub mod responses;
pub mod subscribers;
pub mod tags;

use async_trait::async_trait;

use crate::db::schemas::{SyncStatus, TagDoc, TagSource};
use crate::types::Result;
use crate::validator::NormalizedSubmission;

pub use responses::MongoResponseStore;
pub use subscribers::MongoSubscriberStore;
pub use tags::MongoTagStore;

/// Resolved identity a submission links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRef {
    /// Subscriber record id (ObjectId hex)
    pub subscriber_id: String,
    /// Case-normalized email
    pub email: String,
}

/// Per-tag result of an upsert batch. One tag's failure never blocks or
/// rolls back the others, so both sides are enumerated.
#[derive(Debug, Clone, Default)]
pub struct TagUpsertSummary {
    pub succeeded: Vec<String>,
    /// (tag, error detail)
    pub failed: Vec<(String, String)>,
}

impl TagUpsertSummary {
    pub fn requested(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Append-only persistence of survey responses
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Create a new response record with sync status `pending`.
    /// Returns the generated response id.
    async fn append(
        &self,
        submission: &NormalizedSubmission,
        identity: &IdentityRef,
    ) -> Result<String>;

    /// Record the sync outcome on an existing response. Callers treat a
    /// failure here as log-and-continue; status tracking is secondary
    /// to having saved the submission at all.
    async fn patch_sync_status(
        &self,
        response_id: &str,
        email: &str,
        status: SyncStatus,
        synced_at: Option<bson::DateTime>,
    ) -> Result<()>;
}

/// Idempotent per-(email, tag) upsert persistence
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Upsert each tag independently and concurrently. Never fails as a
    /// whole; per-tag errors land in the summary.
    async fn upsert_tags(
        &self,
        identity: &IdentityRef,
        tags: &[String],
        source: TagSource,
    ) -> TagUpsertSummary;

    /// Current tag state for an email
    async fn find_by_email(&self, email: &str) -> Result<Vec<TagDoc>>;
}

/// Subscriber identity lookup
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Resolve the identity for an email, creating a minimal stub
    /// record when absent.
    async fn resolve(&self, name: &str, email: &str) -> Result<IdentityRef>;
}
