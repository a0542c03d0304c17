//! Zapflow - campaign service entry point

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zapflow_common::config::Config;
use zapflow_core::{CampaignManager, GatewayClient, MessageDispatcher};
use zapflow_storage::db::DatabasePool;
use zapflow_storage::repository::{CampaignRepository, RecipientRepository, TemplateRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so logging can honor it
    let config = Config::load()?;
    init_logging(&config);

    info!("Starting Zapflow campaign service...");

    // Initialize database
    let db_pool = DatabasePool::new(&config.database).await?;
    info!("Database connection established");

    // Run migrations
    db_pool.migrate().await?;
    info!("Database migrations completed");

    // Repositories
    let campaigns = Arc::new(CampaignRepository::new(db_pool.clone()));
    let templates = Arc::new(TemplateRepository::new(db_pool.clone()));
    let recipients = Arc::new(RecipientRepository::new(db_pool.clone()));

    // Gateway client
    let sender = Arc::new(GatewayClient::new(config.gateway.clone())?);
    info!(base_url = %config.gateway.base_url, "Gateway client ready");

    // Dispatcher and manager
    let dispatcher = MessageDispatcher::new(
        campaigns.clone(),
        templates,
        recipients.clone(),
        sender,
        config.campaigns.template_gap_ms,
    );
    let manager = Arc::new(CampaignManager::new(
        campaigns,
        recipients,
        dispatcher,
        config.campaigns.check_interval_secs,
    ));

    // Start the coordinator loop
    let manager_handle = {
        let manager = manager.clone();
        tokio::spawn(async move {
            manager.run().await;
        })
    };

    info!("Zapflow campaign service started");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Let the loop wind down instead of aborting mid-pass
    manager.stop();
    manager_handle.await?;

    info!("Zapflow shutdown complete");

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},zapflow=debug", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
