//! MongoDB-backed tag store
//!
//! Last-write-wins upserts keyed by (email, tag). Each tag in a batch
//! is written independently and concurrently; there is no multi-tag
//! transaction and one failure never rolls back the others.

use async_trait::async_trait;
use bson::{doc, DateTime};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::db::schemas::{TagDoc, TagSource};
use crate::db::{MongoClient, MongoCollection};
use crate::store::{IdentityRef, TagStore, TagUpsertSummary};
use crate::types::Result;

/// Current-state tag store over the `subscriber_tags` collection
pub struct MongoTagStore {
    collection: MongoCollection<TagDoc>,
}

impl MongoTagStore {
    pub async fn new(client: &MongoClient, collection_name: &str) -> Result<Self> {
        Ok(Self {
            collection: client.collection(collection_name).await?,
        })
    }

    async fn upsert_one(
        &self,
        identity: &IdentityRef,
        tag: &str,
        source: TagSource,
    ) -> Result<()> {
        let now = DateTime::now();
        let filter = doc! { "email": &identity.email, "tag": tag };
        let update = doc! {
            "$set": {
                "source": source.as_str(),
                "subscriber_id": &identity.subscriber_id,
                "metadata.updated_at": now,
            },
            "$setOnInsert": {
                "metadata.created_at": now,
            },
        };

        self.collection.upsert_one(filter, update).await?;
        Ok(())
    }
}

#[async_trait]
impl TagStore for MongoTagStore {
    async fn upsert_tags(
        &self,
        identity: &IdentityRef,
        tags: &[String],
        source: TagSource,
    ) -> TagUpsertSummary {
        let results = join_all(
            tags.iter()
                .map(|tag| async move { (tag, self.upsert_one(identity, tag, source).await) }),
        )
        .await;

        let mut summary = TagUpsertSummary::default();
        for (tag, result) in results {
            match result {
                Ok(()) => summary.succeeded.push(tag.clone()),
                Err(e) => {
                    warn!(email = %identity.email, tag = %tag, error = %e, "Tag upsert failed");
                    summary.failed.push((tag.clone(), e.to_string()));
                }
            }
        }

        debug!(
            email = %identity.email,
            requested = summary.requested(),
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "Tag upsert batch complete"
        );

        summary
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<TagDoc>> {
        self.collection.find_many(doc! { "email": email }).await
    }
}
