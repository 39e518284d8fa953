//! Kit (email marketing) tag sync client
//!
//! One idempotent bearer-auth upsert call per submission, keyed by
//! email and carrying the exportable tag names. Sentinel `_other` tags
//! are filtered out before the call: the free-text answer never leaves
//! this service, and neither does the sentinel that marks it.
//!
//! The outcome here never fails the overall submission. A failed sync
//! is recorded on the stored response and retried later by an
//! out-of-band process that scans for `failed` status; this client
//! never retries inline, to keep request latency bounded.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::catalog;
use crate::sync::{SyncOutcome, TagSync};

/// Kit API configuration
#[derive(Debug, Clone)]
pub struct KitConfig {
    /// Bearer credential; absent disables sync entirely
    pub api_key: Option<String>,
    /// API base URL, e.g. `https://api.kit.com/v4`
    pub api_base: String,
    /// Optional grouping identifier attached to the upsert
    pub form_id: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.kit.com/v4".to_string(),
            form_id: None,
            timeout: Duration::from_secs(15),
        }
    }
}

/// HTTP client for the Kit tagging API
pub struct KitClient {
    config: KitConfig,
    http: reqwest::Client,
}

impl KitClient {
    pub fn new(config: KitConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, http }
    }

    /// Whether a credential is configured
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

/// Drop sentinel `_other` tags; only catalog tags safe for export remain
pub fn exportable_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter(|t| !catalog::is_other_sentinel(t))
        .cloned()
        .collect()
}

#[async_trait]
impl TagSync for KitClient {
    async fn sync(&self, email: &str, tags: &[String]) -> SyncOutcome {
        let export = exportable_tags(tags);

        let Some(ref api_key) = self.config.api_key else {
            debug!(email = %email, "Kit sync skipped: credential not configured");
            return SyncOutcome::Skipped {
                reason: "Kit credential not configured".to_string(),
            };
        };

        if export.is_empty() {
            debug!(email = %email, "Kit sync skipped: no exportable tags");
            return SyncOutcome::Skipped {
                reason: "No exportable tags after filtering".to_string(),
            };
        }

        let mut body = json!({
            "email_address": email,
            "tags": export,
        });
        if let Some(ref form_id) = self.config.form_id {
            body["form_id"] = json!(form_id);
        }

        let url = format!("{}/subscribers/tags", self.config.api_base);

        let response = match self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(email = %email, error = %e, "Kit sync request failed");
                return SyncOutcome::Failed {
                    detail: format!("Request failed: {}", e),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Capture the raw body for later diagnosis
            let detail_body = response.text().await.unwrap_or_default();
            warn!(email = %email, status = %status, "Kit sync returned non-success");
            return SyncOutcome::Failed {
                detail: format!("HTTP {}: {}", status, detail_body),
            };
        }

        debug!(email = %email, tags = export.len(), "Kit sync succeeded");
        SyncOutcome::Success
    }
}
