use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &rolodex::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let db = Arc::new(rolodex::db::Db::connect(cfg)?);
    info!(choice = ?db.engine().choice(), "database engine ready");

    // Degraded mode on schema failure: the process still serves, requests
    // fail until storage is reachable.
    match rolodex::db::contacts::init_schema(&db).await {
        Ok(()) => info!("database schema ready"),
        Err(e) => warn!(error = %e, "schema initialization failed, continuing degraded"),
    }

    if cfg.seed
        && let Err(e) = rolodex::db::contacts::seed(&db).await
    {
        warn!(error = %e, "database seeding failed");
    }

    let state = rolodex::router::RolodexState::new(db.clone(), cfg);
    let app = rolodex::router::rolodex_router(state);

    let listener = TcpListener::bind(&cfg.bind).await?;
    info!("HTTP server listening on {}", cfg.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
