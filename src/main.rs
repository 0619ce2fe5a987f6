use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use activity_badges::{
    api::{create_badge_router, BadgeApiState},
    config::BadgeConfig,
    service::load_snapshot,
    ActivityService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first - this validates capacity and thresholds
    let config = BadgeConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {:#}", e);
        eprintln!("Please check BADGES_* environment variables.");
        e
    })?;

    init_logging(&config)?;

    info!("Starting activity badge service");
    if config.admin.api_key.is_none() {
        warn!("BADGES_ADMIN_API_KEY not set, administrative endpoints are disabled");
    }

    let service = Arc::new(build_service(&config).await?);
    info!(
        "Leaderboard capacity={}, thresholds={:?}",
        config.leaderboard.capacity, config.tiers.thresholds
    );

    // Log every promotion
    let mut promotions = service.subscribe();
    tokio::spawn(async move {
        loop {
            match promotions.recv().await {
                Ok(change) => info!(
                    account = %change.account,
                    badge_id = change.badge_id,
                    tier = %change.tier,
                    newly_issued = change.newly_issued,
                    "Tier change"
                ),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Tier change listener lagged, skipped {} events", skipped)
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let app = Router::new()
        .merge(create_badge_router(BadgeApiState {
            service: service.clone(),
            admin_api_key: config.admin.api_key.clone(),
        }))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Badge service listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Badge service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Restore from the state file when one exists, otherwise start empty
async fn build_service(config: &BadgeConfig) -> Result<ActivityService> {
    let capacity = config.leaderboard.capacity;

    let Some(ref path) = config.persistence.state_path else {
        info!("No state path configured, running in memory only");
        let service = ActivityService::new(capacity, config.threshold_table()?)?;
        service.set_fee(config.admin.fee).await?;
        return Ok(service);
    };

    let service = match load_snapshot(path).await? {
        Some(snapshot) => {
            info!("Restoring state from {}", path.display());
            ActivityService::restore(snapshot, capacity)
                .with_context(|| format!("Snapshot {} is inconsistent", path.display()))?
        }
        None => {
            info!("No snapshot at {}, starting fresh", path.display());
            let service = ActivityService::new(capacity, config.threshold_table()?)?;
            service.set_fee(config.admin.fee).await?;
            service
        }
    };

    Ok(service.with_state_file(path.clone()))
}

fn init_logging(config: &BadgeConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
