//! MongoDB-backed response store

use async_trait::async_trait;
use bson::{doc, DateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::schemas::{SurveyResponseDoc, SyncStatus};
use crate::db::{MongoClient, MongoCollection};
use crate::store::{IdentityRef, ResponseStore};
use crate::types::{IntakeError, Result};
use crate::validator::NormalizedSubmission;

/// Append-only store over the `survey_responses` collection
pub struct MongoResponseStore {
    collection: MongoCollection<SurveyResponseDoc>,
}

impl MongoResponseStore {
    pub async fn new(client: &MongoClient, collection_name: &str) -> Result<Self> {
        Ok(Self {
            collection: client.collection(collection_name).await?,
        })
    }

    /// Fetch a response by its generated id
    pub async fn find_by_response_id(
        &self,
        response_id: &str,
    ) -> Result<Option<SurveyResponseDoc>> {
        self.collection
            .find_one(doc! { "response_id": response_id })
            .await
    }
}

#[async_trait]
impl ResponseStore for MongoResponseStore {
    async fn append(
        &self,
        submission: &NormalizedSubmission,
        identity: &IdentityRef,
    ) -> Result<String> {
        let response_id = Uuid::new_v4().to_string();

        let record = SurveyResponseDoc {
            _id: None,
            metadata: Default::default(),
            response_id: response_id.clone(),
            email: submission.email.clone(),
            name: submission.name.clone(),
            subscriber_id: identity.subscriber_id.clone(),
            answers: submission.answers.clone(),
            recommendations: submission.recommendations.clone(),
            tags: submission.tags.clone(),
            profession_other: submission.profession_other.clone(),
            modality_other: submission.modality_other.clone(),
            sync_status: SyncStatus::Pending,
            synced_at: None,
            completed: submission.completed,
            submitted_at: DateTime::from_chrono(submission.submitted_at),
        };

        self.collection.insert_one(record).await?;

        debug!(
            response_id = %response_id,
            email = %submission.email,
            "Survey response stored"
        );

        Ok(response_id)
    }

    async fn patch_sync_status(
        &self,
        response_id: &str,
        email: &str,
        status: SyncStatus,
        synced_at: Option<DateTime>,
    ) -> Result<()> {
        let mut set = doc! {
            "sync_status": status.as_str(),
            "metadata.updated_at": DateTime::now(),
        };
        if let Some(at) = synced_at {
            set.insert("synced_at", at);
        }

        let result = self
            .collection
            .update_one(doc! { "response_id": response_id, "email": email }, doc! { "$set": set })
            .await?;

        if result.matched_count == 0 {
            warn!(response_id = %response_id, "No response matched for sync status patch");
            return Err(IntakeError::Database(format!(
                "Response {} not found for status patch",
                response_id
            )));
        }

        Ok(())
    }
}
