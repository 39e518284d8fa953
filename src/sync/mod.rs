//! External tag synchronization

pub mod kit;

use async_trait::async_trait;

pub use kit::{exportable_tags, KitClient, KitConfig};

/// Tri-state outcome of one sync attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    /// Network failure, timeout, or non-2xx status; the raw detail is
    /// kept for later diagnosis
    Failed { detail: String },
    /// No call was attempted (missing credential or nothing to send)
    Skipped { reason: String },
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Success => "success",
            SyncOutcome::Failed { .. } => "failed",
            SyncOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Seam for the external tag service call
#[async_trait]
pub trait TagSync: Send + Sync {
    /// Propagate the exportable subset of `tags` for `email`. Never
    /// fails the submission; the outcome is recorded, not raised.
    async fn sync(&self, email: &str, tags: &[String]) -> SyncOutcome;
}
