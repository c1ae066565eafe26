mod advisor;
mod routes;
mod state;
mod tick_loop;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use advisor::{AdvisorBackend, AdvisorDesk};
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use farm_control::AutoFarmer;
use farm_core::LocationId;
use farm_world::{build_initial_state, load_content, session_rng};
use parking_lot::Mutex;
use state::{AppState, Session};
use tick_loop::SessionTasks;

#[derive(Parser)]
#[command(name = "farm_daemon", about = "Satellite Data Farm session host")]
struct Cli {
    #[arg(long, default_value = "./content")]
    content_dir: String,
    #[arg(long, default_value = "central_valley_usa")]
    location: String,
    #[arg(long)]
    seed: Option<u64>,
    /// Scheduler rate; one tick every 2.5s by default. 0 runs flat out.
    #[arg(long, default_value_t = 0.4)]
    ticks_per_sec: f64,
    /// Assistant tip refresh period; 0 disables the timer.
    #[arg(long, default_value_t = 30)]
    tip_every_secs: u64,
    /// Stop the scheduler after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Let the autoplayer farm on every tick.
    #[arg(long)]
    autoplay: bool,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        return;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_daemon=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let content = load_content(&cli.content_dir)?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = session_rng(seed);
    let location = LocationId(cli.location.clone());
    let game_state = build_initial_state(&content, &location, seed, &mut rng)?;
    tracing::info!(
        seed,
        location = %game_state.meta.location,
        session = %game_state.meta.session_id,
        content_version = %content.content_version,
        "session started"
    );

    let cors_origin: HeaderValue = cli
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin: {}", cli.cors_origin))?;

    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let app_state = AppState {
        session: Arc::new(Mutex::new(Session {
            game_state,
            content,
            rng,
            autoplayer: cli.autoplay.then(AutoFarmer::default),
            next_command_id: 0,
        })),
        event_tx,
        desk: Arc::new(AdvisorDesk::new(AdvisorBackend::from_env())),
        ticks_per_sec: cli.ticks_per_sec,
    };

    let tip_every = (cli.tip_every_secs > 0).then(|| Duration::from_secs(cli.tip_every_secs));
    let tasks = SessionTasks::spawn(&app_state, tip_every, cli.max_ticks);

    let router = routes::make_router(app_state, cors_origin);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    tracing::debug!(running = tasks.is_running(), "stopping session tasks");
    tasks.shutdown().await;
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_app(ticks_per_sec: f64) -> AppState {
    use farm_core::test_fixtures::{base_content, base_state, make_rng};

    let content = base_content();
    let game_state = base_state(&content);
    let (event_tx, _) = tokio::sync::broadcast::channel(64);
    AppState {
        session: Arc::new(Mutex::new(Session {
            game_state,
            content,
            rng: make_rng(),
            autoplayer: None,
            next_command_id: 0,
        })),
        event_tx,
        desk: Arc::new(AdvisorDesk::new(AdvisorBackend::Local(
            farm_control::FieldAnalyst,
        ))),
        ticks_per_sec,
    }
}
