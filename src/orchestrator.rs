//! Submission orchestrator
//!
//! Sequences one submission through the pipeline: validate, resolve
//! identity, append the durable response record, upsert tags, sync to
//! Kit, record the sync outcome. The contract is strict: before the
//! response record exists, any failure surfaces to the caller; after
//! it, every failure is absorbed, logged, and reflected only in status
//! fields and the returned summary. A downstream outage never loses or
//! blocks on already-saved data.

use std::sync::Arc;

use bson::DateTime;
use serde::Serialize;
use tracing::{info, warn};

use crate::db::schemas::{SyncStatus, TagSource};
use crate::store::{IdentityRef, ResponseStore, SubscriberStore, TagStore};
use crate::sync::{SyncOutcome, TagSync};
use crate::types::IntakeError;
use crate::validator::{self, FieldViolation, SubmissionRequest};

/// Non-success outcomes of one submission
#[derive(Debug)]
pub enum SubmitError {
    /// Validation failed; no writes were performed
    Rejected(Vec<FieldViolation>),
    /// The durable write failed; nothing downstream can be trusted
    Storage(IntakeError),
}

/// Success summary returned to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub response_id: String,
    pub tags_requested: usize,
    pub tags_added: usize,
    pub tags_failed: Vec<String>,
    pub recommendations_count: usize,
    pub kit_sync_status: String,
}

/// Sequences the submission pipeline over injected collaborators
pub struct Orchestrator {
    responses: Arc<dyn ResponseStore>,
    tags: Arc<dyn TagStore>,
    subscribers: Arc<dyn SubscriberStore>,
    sync: Arc<dyn TagSync>,
}

impl Orchestrator {
    pub fn new(
        responses: Arc<dyn ResponseStore>,
        tags: Arc<dyn TagStore>,
        subscribers: Arc<dyn SubscriberStore>,
        sync: Arc<dyn TagSync>,
    ) -> Self {
        Self {
            responses,
            tags,
            subscribers,
            sync,
        }
    }

    /// Process one submission to completion. No mid-pipeline abort:
    /// once validation passes, every remaining step runs.
    pub async fn process(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionSummary, SubmitError> {
        // RECEIVED -> VALIDATED. Terminal rejection performs zero writes.
        let submission = validator::validate(request).map_err(SubmitError::Rejected)?;

        let identity: IdentityRef = self
            .subscribers
            .resolve(&submission.name, &submission.email)
            .await
            .map_err(SubmitError::Storage)?;

        // VALIDATED -> STORED. The one failure past validation that may
        // produce an error response.
        let response_id = self
            .responses
            .append(&submission, &identity)
            .await
            .map_err(SubmitError::Storage)?;

        info!(
            response_id = %response_id,
            email = %submission.email,
            tags = submission.tags.len(),
            "Survey submission stored"
        );

        // STORED -> TAGGED. Partial failures recorded, never fatal.
        let tag_summary = self
            .tags
            .upsert_tags(&identity, &submission.tags, TagSource::Survey)
            .await;

        // TAGGED -> DONE. Sync outcome is recorded best-effort; a
        // skipped sync leaves the stored status pending so the failed
        // scan never picks it up.
        let outcome = self.sync.sync(&submission.email, &submission.tags).await;
        let patch = match &outcome {
            SyncOutcome::Success => Some((SyncStatus::Success, Some(DateTime::now()))),
            SyncOutcome::Failed { detail } => {
                warn!(response_id = %response_id, detail = %detail, "Kit sync failed");
                Some((SyncStatus::Failed, None))
            }
            SyncOutcome::Skipped { .. } => None,
        };
        if let Some((status, synced_at)) = patch {
            if let Err(e) = self
                .responses
                .patch_sync_status(&response_id, &submission.email, status, synced_at)
                .await
            {
                warn!(response_id = %response_id, error = %e, "Failed to record sync status");
            }
        }

        Ok(SubmissionSummary {
            response_id,
            tags_requested: tag_summary.requested(),
            tags_added: tag_summary.succeeded.len(),
            tags_failed: tag_summary.failed.iter().map(|(t, _)| t.clone()).collect(),
            recommendations_count: submission.recommendations.len(),
            kit_sync_status: outcome.as_str().to_string(),
        })
    }
}
