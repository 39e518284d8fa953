//! MongoDB-backed subscriber lookup
//!
//! Policy for an absent identity: create a minimal stub record rather
//! than rejecting the submission. A completed survey is never lost
//! because the marketing list has not seen the address yet.

use async_trait::async_trait;
use bson::doc;
use tracing::info;

use crate::db::schemas::SubscriberDoc;
use crate::db::{MongoClient, MongoCollection};
use crate::store::{IdentityRef, SubscriberStore};
use crate::types::{IntakeError, Result};

/// Identity lookup over the `subscribers` collection
pub struct MongoSubscriberStore {
    collection: MongoCollection<SubscriberDoc>,
}

impl MongoSubscriberStore {
    pub async fn new(client: &MongoClient, collection_name: &str) -> Result<Self> {
        Ok(Self {
            collection: client.collection(collection_name).await?,
        })
    }

    async fn find(&self, email: &str) -> Result<Option<IdentityRef>> {
        let found = self.collection.find_one(doc! { "email": email }).await?;
        Ok(found.and_then(|sub| {
            sub._id.map(|id| IdentityRef {
                subscriber_id: id.to_hex(),
                email: sub.email,
            })
        }))
    }
}

#[async_trait]
impl SubscriberStore for MongoSubscriberStore {
    async fn resolve(&self, name: &str, email: &str) -> Result<IdentityRef> {
        if let Some(identity) = self.find(email).await? {
            return Ok(identity);
        }

        match self
            .collection
            .insert_one(SubscriberDoc::stub(name.to_string(), email.to_string()))
            .await
        {
            Ok(id) => {
                info!(email = %email, "Created stub subscriber record");
                Ok(IdentityRef {
                    subscriber_id: id.to_hex(),
                    email: email.to_string(),
                })
            }
            // A concurrent submission may have inserted the same email;
            // the unique index turns that into a duplicate-key error, so
            // re-read before giving up.
            Err(insert_err) => match self.find(email).await? {
                Some(identity) => Ok(identity),
                None => Err(IntakeError::Database(format!(
                    "Failed to create subscriber stub: {}",
                    insert_err
                ))),
            },
        }
    }
}
