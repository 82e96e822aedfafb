use std::sync::Arc;

use wordmaster_engine::config::Config;
use wordmaster_engine::db::{schema, DatabaseProxy};
use wordmaster_engine::logging;
use wordmaster_engine::workers::WorkerManager;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = logging::init_tracing(&config.log_level);

    let db_proxy = match DatabaseProxy::from_env().await {
        Ok(proxy) => Arc::new(proxy),
        Err(err) => {
            tracing::error!(error = %err, "database not available, exiting");
            std::process::exit(1);
        }
    };

    match db_proxy.ping().await {
        Ok(latency) => tracing::info!(latency_ms = latency.as_millis() as u64, "database reachable"),
        Err(err) => {
            tracing::error!(error = %err, "database ping failed, exiting");
            std::process::exit(1);
        }
    }

    if let Err(err) = schema::ensure_schema(db_proxy.pool()).await {
        tracing::error!(error = %err, "schema bootstrap failed, exiting");
        std::process::exit(1);
    }

    let worker_manager = match WorkerManager::new(Arc::clone(&db_proxy), config.clone()).await {
        Ok(manager) => {
            if let Err(e) = manager.start().await {
                tracing::error!(error = %e, "failed to start workers");
            }
            manager
        }
        Err(e) => {
            tracing::error!(error = %e, "worker manager not initialized, exiting");
            std::process::exit(1);
        }
    };

    tracing::info!(
        decay_schedule = %config.decay_schedule,
        cleanup_schedule = %config.cleanup_schedule,
        "wordmaster-engine running"
    );

    shutdown_signal().await;

    tracing::info!("Shutdown signal received, stopping workers");
    worker_manager.stop().await;
    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
