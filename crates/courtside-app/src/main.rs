// Courtside entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load the player pool
// 4. Build the session
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Run the operator console until quit
// 8. Cleanup on exit

use courtside_app::{app, console};
use courtside_core::config;
use courtside_core::pool::{PlayerPool, PoolSource};
use courtside_core::SessionState;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Courtside starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} participants, ${} starting budget",
        config.league.name,
        config.league.participants.len(),
        config.league.starting_budget
    );

    // 3. Load the player pool
    let source = config.pool_source();
    let pool = PlayerPool::load(&source)
        .with_context(|| format!("failed to load player pool from {}", source.describe()))?;
    info!("Loaded {} players", pool.len());

    // 4. Build the session
    let session =
        SessionState::from_config(&config, pool).context("failed to create draft session")?;
    let app_state = app::AppState::new(session, Box::new(source));

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 6. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the console (blocking until the operator quits)
    println!("{}", config.league.name);
    if let Err(e) = console::run(ui_rx, cmd_tx).await {
        error!("Console error: {}", e);
    }

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Courtside shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which hosts the console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtside=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
