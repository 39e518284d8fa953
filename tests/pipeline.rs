//! End-to-end pipeline tests over in-memory stores
//!
//! Drives the orchestrator through fakes that keep honest store
//! semantics: the tag fake upserts into a keyed map (so idempotence is
//! real, not asserted), and the response fake tracks sync status so the
//! ordering contract is observable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bson::DateTime;

use intake::db::schemas::{SyncStatus, TagDoc, TagSource};
use intake::orchestrator::{Orchestrator, SubmitError};
use intake::store::{
    IdentityRef, ResponseStore, SubscriberStore, TagStore, TagUpsertSummary,
};
use intake::sync::{SyncOutcome, TagSync};
use intake::types::{IntakeError, Result};
use intake::validator::{CustomResponses, NormalizedSubmission, SubmissionRequest, SurveyData};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Debug, Clone)]
struct StoredResponse {
    email: String,
    tags: Vec<String>,
    sync_status: SyncStatus,
    synced_at: Option<DateTime>,
}

#[derive(Default)]
struct MemResponses {
    records: Mutex<HashMap<String, StoredResponse>>,
}

impl MemResponses {
    fn status_of(&self, response_id: &str) -> Option<SyncStatus> {
        self.records
            .lock()
            .unwrap()
            .get(response_id)
            .map(|r| r.sync_status)
    }
}

#[async_trait]
impl ResponseStore for MemResponses {
    async fn append(
        &self,
        submission: &NormalizedSubmission,
        _identity: &IdentityRef,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.records.lock().unwrap().insert(
            id.clone(),
            StoredResponse {
                email: submission.email.clone(),
                tags: submission.tags.clone(),
                sync_status: SyncStatus::Pending,
                synced_at: None,
            },
        );
        Ok(id)
    }

    async fn patch_sync_status(
        &self,
        response_id: &str,
        _email: &str,
        status: SyncStatus,
        synced_at: Option<DateTime>,
    ) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(response_id)
            .ok_or_else(|| IntakeError::Database("response not found".into()))?;
        record.sync_status = status;
        record.synced_at = synced_at;
        Ok(())
    }
}

/// Tag record with distinct created/updated stamps so the
/// refresh-on-reupsert behavior is observable
#[derive(Debug, Clone)]
struct MemTagRecord {
    source: TagSource,
    created_gen: u64,
    updated_gen: u64,
}

#[derive(Default)]
struct MemTags {
    records: Mutex<HashMap<(String, String), MemTagRecord>>,
    generation: Mutex<u64>,
}

impl MemTags {
    fn count_for(&self, email: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .keys()
            .filter(|(e, _)| e == email)
            .count()
    }
}

#[async_trait]
impl TagStore for MemTags {
    async fn upsert_tags(
        &self,
        identity: &IdentityRef,
        tags: &[String],
        source: TagSource,
    ) -> TagUpsertSummary {
        let batch_gen = {
            let mut g = self.generation.lock().unwrap();
            *g += 1;
            *g
        };
        let mut summary = TagUpsertSummary::default();
        let mut records = self.records.lock().unwrap();
        for tag in tags {
            let key = (identity.email.clone(), tag.clone());
            records
                .entry(key)
                .and_modify(|r| {
                    // Last-write-wins: refresh stamp and source, no new record
                    r.updated_gen = batch_gen;
                    r.source = source;
                })
                .or_insert(MemTagRecord {
                    source,
                    created_gen: batch_gen,
                    updated_gen: batch_gen,
                });
            summary.succeeded.push(tag.clone());
        }
        summary
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<TagDoc>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((e, _), _)| e == email)
            .map(|((e, t), record)| TagDoc {
                email: e.clone(),
                tag: t.clone(),
                source: record.source,
                ..Default::default()
            })
            .collect())
    }
}

struct MemSubscribers;

#[async_trait]
impl SubscriberStore for MemSubscribers {
    async fn resolve(&self, _name: &str, email: &str) -> Result<IdentityRef> {
        Ok(IdentityRef {
            subscriber_id: "64a000000000000000000042".to_string(),
            email: email.to_string(),
        })
    }
}

struct FixedSync(SyncOutcome);

#[async_trait]
impl TagSync for FixedSync {
    async fn sync(&self, _email: &str, _tags: &[String]) -> SyncOutcome {
        self.0.clone()
    }
}

/// Sync fake that records the stored response's status at the moment
/// the sync step runs
struct StatusObservingSync {
    responses: Arc<MemResponses>,
    observed: Mutex<Vec<SyncStatus>>,
}

#[async_trait]
impl TagSync for StatusObservingSync {
    async fn sync(&self, email: &str, _tags: &[String]) -> SyncOutcome {
        let records = self.responses.records.lock().unwrap();
        let statuses: Vec<SyncStatus> = records
            .values()
            .filter(|r| r.email == email)
            .map(|r| r.sync_status)
            .collect();
        drop(records);
        self.observed.lock().unwrap().extend(statuses);
        SyncOutcome::Success
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn nine_tag_request() -> SubmissionRequest {
    SubmissionRequest {
        name: "Riley Okafor".to_string(),
        email: "riley@example.com".to_string(),
        survey_data: SurveyData {
            setting: Some("set_group_practice".to_string()),
            profession: Some("prof_psychologist".to_string()),
            populations: vec![
                "pop_adults".to_string(),
                "pop_couples".to_string(),
                "pop_teens".to_string(),
            ],
            interests: vec![
                "int_worksheets".to_string(),
                "int_treatment_planning".to_string(),
            ],
            frequency: Some("freq_weekly".to_string()),
            modalities: vec!["mod_act".to_string(), "mod_emdr".to_string()],
            profession_other: None,
            modality_other: None,
        },
        recommendations: vec!["rec_act_bundle".to_string()],
        selected_tags: vec![
            "set_group_practice".to_string(),
            "prof_psychologist".to_string(),
            "pop_adults".to_string(),
            "pop_couples".to_string(),
            "pop_teens".to_string(),
            "int_worksheets".to_string(),
            "int_treatment_planning".to_string(),
            "freq_weekly".to_string(),
            "mod_act".to_string(),
        ],
        custom_responses: CustomResponses::default(),
        timestamp: None,
        completed: None,
    }
}

fn orchestrator_with(
    responses: Arc<MemResponses>,
    tags: Arc<MemTags>,
    sync: Arc<dyn TagSync>,
) -> Orchestrator {
    Orchestrator::new(responses, tags, Arc::new(MemSubscribers), sync)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn response_is_pending_before_sync_runs() {
    let responses = Arc::new(MemResponses::default());
    let observing = Arc::new(StatusObservingSync {
        responses: Arc::clone(&responses),
        observed: Mutex::new(Vec::new()),
    });
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::new(MemTags::default()),
        Arc::clone(&observing) as Arc<dyn TagSync>,
    );

    let summary = orch.process(nine_tag_request()).await.expect("should succeed");

    // At sync time the stored record was still pending
    let observed = observing.observed.lock().unwrap();
    assert_eq!(observed.as_slice(), &[SyncStatus::Pending]);
    // And afterwards the success was recorded
    assert_eq!(responses.status_of(&summary.response_id), Some(SyncStatus::Success));
}

#[tokio::test]
async fn double_submission_leaves_exactly_nine_tag_records() {
    let responses = Arc::new(MemResponses::default());
    let tags = Arc::new(MemTags::default());
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::clone(&tags),
        Arc::new(FixedSync(SyncOutcome::Success)),
    );

    orch.process(nine_tag_request()).await.expect("first submission");
    orch.process(nine_tag_request()).await.expect("second submission");

    // Tag store is a current-state projection: 9 records, not 18
    assert_eq!(tags.count_for("riley@example.com"), 9);
    // But the audit trail appended both submissions
    assert_eq!(responses.records.lock().unwrap().len(), 2);

    // Re-upsert refreshed the timestamps without recreating records
    let records = tags.records.lock().unwrap();
    for record in records.values() {
        assert!(record.updated_gen > record.created_gen);
    }
}

#[tokio::test]
async fn sync_failure_still_returns_success_with_failed_status() {
    let responses = Arc::new(MemResponses::default());
    let tags = Arc::new(MemTags::default());
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::clone(&tags),
        Arc::new(FixedSync(SyncOutcome::Failed {
            detail: "operation timed out".to_string(),
        })),
    );

    let summary = orch
        .process(nine_tag_request())
        .await
        .expect("submission must succeed despite sync outage");

    assert_eq!(summary.kit_sync_status, "failed");
    assert_eq!(summary.tags_added, 9);
    assert_eq!(responses.status_of(&summary.response_id), Some(SyncStatus::Failed));
}

#[tokio::test]
async fn invalid_tag_rejected_with_zero_writes() {
    let responses = Arc::new(MemResponses::default());
    let tags = Arc::new(MemTags::default());
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::clone(&tags),
        Arc::new(FixedSync(SyncOutcome::Success)),
    );

    let mut bad = nine_tag_request();
    bad.selected_tags.push("tag_definitely_not_in_catalog".to_string());

    match orch.process(bad).await {
        Err(SubmitError::Rejected(violations)) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "selectedTags");
            assert!(violations[0].message.contains("tag_definitely_not_in_catalog"));
        }
        Ok(summary) => panic!("expected rejection, got response {}", summary.response_id),
        Err(SubmitError::Storage(e)) => panic!("expected rejection, got storage error {}", e),
    }

    assert!(responses.records.lock().unwrap().is_empty());
    assert_eq!(tags.count_for("riley@example.com"), 0);
}

#[tokio::test]
async fn populations_round_trip_with_survey_source() {
    let responses = Arc::new(MemResponses::default());
    let tags = Arc::new(MemTags::default());
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::clone(&tags),
        Arc::new(FixedSync(SyncOutcome::Success)),
    );

    orch.process(nine_tag_request()).await.expect("should succeed");

    let stored = tags.find_by_email("riley@example.com").await.unwrap();
    let names: Vec<&str> = stored.iter().map(|t| t.tag.as_str()).collect();
    assert!(names.contains(&"pop_adults"));
    assert!(names.contains(&"pop_couples"));
    assert!(stored.iter().all(|t| t.source == TagSource::Survey));
}

#[tokio::test]
async fn stored_response_keeps_full_tag_list() {
    let responses = Arc::new(MemResponses::default());
    let orch = orchestrator_with(
        Arc::clone(&responses),
        Arc::new(MemTags::default()),
        Arc::new(FixedSync(SyncOutcome::Skipped {
            reason: "Kit credential not configured".to_string(),
        })),
    );

    let summary = orch.process(nine_tag_request()).await.expect("should succeed");

    let records = responses.records.lock().unwrap();
    let stored = records.get(&summary.response_id).unwrap();
    assert_eq!(stored.tags.len(), 9);
    assert_eq!(stored.email, "riley@example.com");
    // Skipped sync never patches the record
    assert_eq!(stored.sync_status, SyncStatus::Pending);
    assert!(stored.synced_at.is_none());
}
