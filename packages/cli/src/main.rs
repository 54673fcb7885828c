use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use lemonlime::{ClockBackend, Event, LoopExit, Synchronizer, SynchronizerConfig, VirtualTime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// lemonlime CLI
/// Drive a gated virtual clock from the command line
#[derive(Parser)]
#[command(name = "lemonlime")]
#[command(about = "Gated virtual-clock synchronizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the advance loop until its end or ctrl-c
    Run {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Virtual start (RFC 3339), overrides the config
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Virtual step in milliseconds, overrides the config
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Seconds from start to end, overrides the config
        #[arg(long)]
        span_secs: Option<u64>,
        /// Real pause between ticks in milliseconds, overrides the config
        #[arg(long)]
        tick_pause_ms: Option<u64>,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Publish one event mid-run and watch the clock stall and resume
    Demo {
        /// How long the demo task holds its event, in milliseconds
        #[arg(long, default_value_t = 1_000)]
        work_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("⚡ lemonlime v{}", lemonlime::VERSION);

    match cli.command {
        Commands::Run {
            config,
            start,
            interval_ms,
            span_secs,
            tick_pause_ms,
            json,
        } => {
            let mut settings = match config {
                Some(path) => SynchronizerConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => SynchronizerConfig::default(),
            };
            if start.is_some() {
                settings.start = start;
            }
            if let Some(interval_ms) = interval_ms {
                settings.interval_ms = interval_ms;
            }
            if let Some(span_secs) = span_secs {
                settings.span_secs = span_secs;
                settings.end = None;
            }
            if let Some(tick_pause_ms) = tick_pause_ms {
                settings.tick_pause_ms = tick_pause_ms;
            }
            run(settings, json).await
        }
        Commands::Demo { work_ms } => demo(StdDuration::from_millis(work_ms)).await,
    }
}

async fn run(settings: SynchronizerConfig, json: bool) -> Result<()> {
    let sync = Arc::new(Synchronizer::from_config(&settings).context("Invalid synchronizer settings")?);
    let mut loop_task = spawn_loop(Arc::clone(&sync));

    let exit = tokio::select! {
        joined = &mut loop_task => joined.context("Advance loop task failed")?,
        _ = tokio::signal::ctrl_c() => {
            warn!("🛑 ctrl-c received, stopping advance loop");
            sync.kill();
            loop_task.await.context("Advance loop task failed")?
        }
    };

    info!(?exit, now = %sync.now(), elapsed_ms = sync.total_elapsed().num_milliseconds(), "finished");
    if json {
        println!("{}", sync.snapshot().to_json().context("Failed to serialize snapshot")?);
    }
    Ok(())
}

async fn demo(work: StdDuration) -> Result<()> {
    let sync = Arc::new(Synchronizer::from_date(DateTime::<Utc>::default()));
    sync.set_publishing(true);
    let loop_task = spawn_loop(Arc::clone(&sync));

    tokio::time::sleep(StdDuration::from_secs(1)).await;
    info!(now = %sync.now(), "clock running freely");

    let event = sync.new_event().context("Failed to publish demo event")?;
    let key = event.id().to_owned();
    sync.register_event(&key, Arc::clone(&event));
    info!(event = %key, "event registered, clock is held");

    let held_at = sync.now();
    example_task(Arc::clone(&event), work).await;
    info!(held_at = %held_at, now = %sync.now(), "task finished");

    sync.pop_event(&key, &key);
    tokio::time::sleep(StdDuration::from_secs(1)).await;
    info!(now = %sync.now(), "clock resumed");

    sync.kill();
    let exit: LoopExit = loop_task.await.context("Advance loop task failed")?;
    info!(?exit, elapsed_ms = sync.total_elapsed().num_milliseconds(), "demo complete");
    Ok(())
}

async fn example_task(event: Arc<Event>, work: StdDuration) {
    tokio::time::sleep(work).await;
    info!(event = event.id(), "event done!");
    event.complete_event();
}

fn spawn_loop(sync: Arc<Synchronizer>) -> tokio::task::JoinHandle<LoopExit> {
    let state = sync.clock().state();
    tokio::task::spawn_blocking(move || sync.bang(state.current, state.interval, state.end))
}
