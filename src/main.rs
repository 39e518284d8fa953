//! Intake - survey submission service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake::{
    config::Args,
    db::MongoClient,
    orchestrator::Orchestrator,
    rate_limit::RateLimiter,
    server::{self, AppState},
    store::{MongoResponseStore, MongoSubscriberStore, MongoTagStore},
    sync::KitClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("intake={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before touching anything external
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Intake - survey submission service");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("MongoDB database: {}", args.mongodb_db);
    info!(
        "Kit sync: {}",
        if args.kit_api_key.is_some() { "configured" } else { "disabled (skipped outcomes)" }
    );
    info!(
        "Rate limit: {} submissions / {}s per caller",
        args.rate_limit_max, args.rate_limit_window_secs
    );
    info!("======================================");

    // The persistence backend is mandatory; without a durable store
    // nothing downstream can be trusted
    let mongodb_uri = args.mongodb_uri.clone().unwrap_or_default();
    let mongo = match MongoClient::new(&mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Explicit store construction and injection, no lazy module state
    let responses = Arc::new(MongoResponseStore::new(&mongo, &args.responses_collection).await?);
    let tags = Arc::new(MongoTagStore::new(&mongo, &args.tags_collection).await?);
    let subscribers =
        Arc::new(MongoSubscriberStore::new(&mongo, &args.subscribers_collection).await?);
    let kit = Arc::new(KitClient::new(args.kit_config()));

    let orchestrator = Arc::new(Orchestrator::new(responses, tags, subscribers, kit));
    let limiter = Arc::new(RateLimiter::new(
        args.rate_limit_max,
        args.rate_limit_window(),
    ));

    let state = Arc::new(AppState::new(args, orchestrator, limiter));

    server::run(state).await?;

    Ok(())
}
