//! `lotvisor` command-line driver.
//!
//! Runs one simulation with the given overrides, printing a status line every
//! time occupancy or the lane direction changes, and shuts down gracefully on
//! SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere).

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use lotvisor::{Config, Direction, Observe, Simulation, Status, Subscribe, cancel_on_signal};

/// Concurrent parking-lot simulator.
#[derive(Debug, Parser)]
#[command(name = "lotvisor", version, about)]
struct Cli {
    /// Number of parking spots.
    #[arg(long)]
    capacity: Option<usize>,

    /// Vehicles to process before the run completes.
    #[arg(long)]
    quota: Option<u64>,

    /// Mean arrivals per second.
    #[arg(long)]
    rate: Option<f64>,

    /// Entry retries before a vehicle is rejected.
    #[arg(long = "max-retries")]
    max_retries: Option<u32>,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long = "log-level", default_value_t = Level::INFO)]
    log_level: Level,

    /// Emit JSON log lines.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mut cfg = Config::default();
        if let Some(capacity) = self.capacity {
            cfg.capacity = capacity;
        }
        if let Some(quota) = self.quota {
            cfg.quota = quota;
        }
        if let Some(rate) = self.rate {
            cfg.arrival_rate = rate;
        }
        if let Some(max_retries) = self.max_retries {
            cfg.retry.max_retries = max_retries;
        }
        cfg.seed = self.seed;
        cfg
    }
}

fn init_tracing(level: Level, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME"))));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Logs the status line whenever occupancy or direction changes.
#[derive(Default)]
struct Console {
    last: Mutex<Option<(usize, Direction)>>,
}

impl Observe for Console {
    fn on_status(&self, status: &Status) {
        let key = (status.occupied, status.direction);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if *last != Some(key) {
            *last = Some(key);
            info!("{status}");
        }
    }

    fn on_completed(&self, status: &Status) {
        info!(processed = status.processed, rejected = status.rejected, "all vehicles processed");
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level, cli.json);

    #[cfg(feature = "logging")]
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(lotvisor::LogWriter::new())];
    #[cfg(not(feature = "logging"))]
    let subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();

    let cfg = cli.config();
    info!(
        capacity = cfg.capacity,
        quota = cfg.quota,
        rate = cfg.arrival_rate,
        max_retries = cfg.retry.max_retries,
        seed = ?cfg.seed,
        "starting simulation"
    );

    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(Console::default())];
    let sim = Simulation::builder(cfg)
        .with_observers(observers)
        .with_subscribers(subscribers)
        .build()
        .context("invalid configuration")?;

    tokio::spawn(cancel_on_signal(sim.shutdown_token()));

    let status = sim.run().await.context("simulation did not shut down cleanly")?;
    info!(%status, "final status");
    Ok(())
}
