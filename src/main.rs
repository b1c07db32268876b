// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensordeck

//! SensorDeck - sensor polling and alerting console
//!
//! Runs the monitoring engine against simulated sensors and accepts
//! operator commands on stdin.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sensordeck::control::{self, Outcome};
use sensordeck::output::NoticeLevel;
use sensordeck::{Config, Engine, NAME, VERSION};

/// SensorDeck - sensor polling and alerting console
#[derive(Parser, Debug)]
#[command(name = "sensordeck")]
#[command(author = "SensorDeck Project")]
#[command(version = VERSION)]
#[command(about = "Poll simulated sensors, classify readings and raise alerts")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Stop automatically after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Do not start monitoring on launch
    #[arg(long)]
    paused: bool,

    /// Seed for the simulated sensors
    #[arg(long)]
    seed: Option<u64>,

    /// Export directory override
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if let Some(dir) = args.export_dir.clone() {
        config.export_dir = dir;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    init_logging(&args, &config.log_level)?;

    info!("{} v{} - sensor polling and alerting", config.app_name, VERSION);
    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_console(config, &args))
}

/// `--trace` / `--debug` win over `RUST_LOG`, which wins over the config level
fn init_logging(args: &Args, configured: &str) -> Result<()> {
    let filter = if args.trace {
        EnvFilter::new("trace")
    } else if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run_console(config: Config, args: &Args) -> Result<()> {
    let engine = Engine::new(config)?;
    let ambient = engine.spawn_ambient_events();

    engine.notice("System ready", NoticeLevel::Success);
    if !args.paused {
        engine.start();
    }

    info!("Type 'help' for commands; Ctrl+C to quit");

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    info!("Input closed; waiting for Ctrl+C");
                    input_open = false;
                    continue;
                };
                match control::handle_line(&engine, &line).await {
                    Outcome::Reply(text) if !text.is_empty() => println!("{}", text),
                    Outcome::Reply(_) => {}
                    Outcome::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = &mut deadline => {
                info!("Run duration elapsed");
                break;
            }
        }
    }

    engine.stop();
    ambient.abort();

    let stats = engine.stats();
    info!(
        "{} shutdown complete: {} data points, {} alerts, uptime {}",
        NAME, stats.data_points, stats.alert_count, stats.uptime
    );
    Ok(())
}
