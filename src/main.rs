use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reaction_timer::clock::MonotonicClock;
use reaction_timer::config::{Config, Retention};
use reaction_timer::{dump, server, AppState, Engine, ReactionChannel};

#[derive(Parser)]
#[command(author, version, about = "Reaction-time measurement engine", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the measurement channel over HTTP (default)
    Serve {
        #[arg(long)]
        listen: Option<String>,
        /// Stimulus period in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        bins: Option<usize>,
        /// Ring-buffer capacity of the sample store
        #[arg(long, conflicts_with = "unbounded")]
        capacity: Option<usize>,
        /// Keep every sample
        #[arg(long)]
        unbounded: bool,
        /// Do not start the stimulus timer on launch
        #[arg(long)]
        no_stimulus: bool,
    },
    /// Print a text histogram of a sample dump ("<n> ns" per line)
    Hist {
        file: PathBuf,
        #[arg(long)]
        bins: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reaction_timer=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Some(Commands::Hist { file, bins }) => {
            if let Some(bins) = bins {
                config.bins = bins;
            }
            config.validate()?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let values = dump::parse(&text)?;
            print!("{}", dump::render(&values, config.bins));
            Ok(())
        }
        Some(Commands::Serve {
            listen,
            interval_ms,
            bins,
            capacity,
            unbounded,
            no_stimulus,
        }) => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
            }
            if let Some(bins) = bins {
                config.bins = bins;
            }
            if let Some(capacity) = capacity {
                config.retention = Retention::EvictOldest { capacity };
            }
            if unbounded {
                config.retention = Retention::Unbounded;
            }
            serve(config, !no_stimulus).await
        }
        None => serve(config, true).await,
    }
}

async fn serve(config: Config, start_stimulus: bool) -> Result<()> {
    config.validate()?;

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   ⏱   REACTION-TIME OBSERVATORY                  ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Build the engine and its channel ─────────────────────
    let engine = Arc::new(Engine::new(&config));
    let channel = ReactionChannel::new(engine, Arc::new(MonotonicClock::new()));
    info!(?config, "engine ready");

    // ── 2. Build shared state ───────────────────────────────────
    let state = Arc::new(AppState::new(config.clone(), channel));
    if start_stimulus {
        let sched = state.channel.start_stimulus(config.interval());
        *state.scheduler.lock().await = Some(sched);
    }

    // ── 3. Build Axum router ────────────────────────────────────
    let app = server::create_router(state.clone());

    // ── 4. Bind & serve ─────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;

    info!(addr = %config.listen, "listening");
    println!("Respond         → POST http://{}/api/response", config.listen);
    println!("Report          → GET  http://{}/api/report", config.listen);
    println!("Metrics SSE     → GET  http://{}/api/metrics/stream", config.listen);
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    // ── 5. Stop the timer before the engine goes away ───────────
    if let Some(sched) = state.scheduler.lock().await.take() {
        sched.stop().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
