//! Configuration
//!
//! CLI arguments and environment variable handling using clap.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::sync::KitConfig;

/// Intake - survey submission service
#[derive(Parser, Debug, Clone)]
#[command(name = "intake")]
#[command(about = "Stores onboarding survey responses and syncs derived tags to Kit")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI (required; startup fails without it)
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "intake")]
    pub mongodb_db: String,

    /// Collection for survey responses
    #[arg(long, env = "RESPONSES_COLLECTION", default_value = "survey_responses")]
    pub responses_collection: String,

    /// Collection for subscriber tags
    #[arg(long, env = "TAGS_COLLECTION", default_value = "subscriber_tags")]
    pub tags_collection: String,

    /// Collection for subscriber identities
    #[arg(long, env = "SUBSCRIBERS_COLLECTION", default_value = "subscribers")]
    pub subscribers_collection: String,

    /// Kit API key (optional; sync is skipped when absent)
    #[arg(long, env = "KIT_API_KEY")]
    pub kit_api_key: Option<String>,

    /// Kit API base URL
    #[arg(long, env = "KIT_API_BASE", default_value = "https://api.kit.com/v4")]
    pub kit_api_base: String,

    /// Optional Kit form/grouping identifier attached to tag upserts
    #[arg(long, env = "KIT_FORM_ID")]
    pub kit_form_id: Option<String>,

    /// Timeout for Kit API calls in seconds
    #[arg(long, env = "KIT_TIMEOUT_SECS", default_value = "15")]
    pub kit_timeout_secs: u64,

    /// Allowed CORS origin for the onboarding form
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "*")]
    pub allowed_origin: String,

    /// Max submissions per caller per window
    #[arg(long, env = "RATE_LIMIT_MAX", default_value = "10")]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "60")]
    pub rate_limit_window_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration before any connections are attempted
    pub fn validate(&self) -> Result<(), String> {
        match self.mongodb_uri.as_deref() {
            None => return Err("MONGODB_URI is required".to_string()),
            Some(uri) if uri.trim().is_empty() => {
                return Err("MONGODB_URI must not be empty".to_string())
            }
            Some(_) => {}
        }

        if self.rate_limit_max == 0 {
            return Err("RATE_LIMIT_MAX must be at least 1".to_string());
        }
        if self.kit_timeout_secs == 0 {
            return Err("KIT_TIMEOUT_SECS must be at least 1".to_string());
        }

        // A missing KIT_API_KEY is not an error: sync degrades to
        // skipped outcomes.
        Ok(())
    }

    /// Kit client configuration derived from these args
    pub fn kit_config(&self) -> KitConfig {
        KitConfig {
            api_key: self.kit_api_key.clone(),
            api_base: self.kit_api_base.trim_end_matches('/').to_string(),
            form_id: self.kit_form_id.clone(),
            timeout: Duration::from_secs(self.kit_timeout_secs),
        }
    }

    /// Rate limit window as a Duration
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
