//! Warband turn engine - Main entry point.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warband_engine::infrastructure::{
    clock::SystemClock, settings::EngineSettings, sqlite_store::SqliteWorldStore,
};
use warband_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warband_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Warband turn engine");

    // Load configuration
    let settings = EngineSettings::from_env();
    tracing::info!(
        commit_sha = %settings.commit_sha,
        interval_ms = settings.turn_interval.as_millis() as u64,
        "Engine settings loaded"
    );

    // Connect storage
    let store = Arc::new(SqliteWorldStore::connect(&settings.database_url).await?);

    // Create application
    let app = Arc::new(App::new(
        store.clone(),
        store,
        Arc::new(SystemClock::new()),
        settings,
    ));

    if app.settings.seed_demo_world {
        app.seed_demo_world().await?;
    }

    // Forward game events to the log until a real transport subscribes.
    let mut events = app.events.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::info!(world_id = %event.world_id(), ?event, "Game event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Game event log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Run the turn daemon until Ctrl-C
    let daemon = app.use_cases.turn.daemon.clone();
    let interval = app.settings.turn_interval;
    let runner = tokio::spawn(async move { daemon.run(interval).await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping turn daemon");
    app.use_cases.turn.daemon.stop();
    runner.await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
