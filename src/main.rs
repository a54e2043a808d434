//! NRC bridge main entry point.
//!
//! Polls named values from Redis and drives 826 DAC outputs with them.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  RedisStore        Board             LogEventSink            │
//! │  (KeyValueStore)   (OutputWriter)    (EventSink)             │
//! │  JsonConfigFile                                              │
//! │  (ConfigPort)                                                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          SamplingLoop (pure logic)                 │      │
//! │  │  FSM · Faults · Stats                              │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  Shutdown (Ctrl-C / SIGTERM)                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use nrc_bridge::adapters::board::OpenError;
use nrc_bridge::adapters::config_file::JsonConfigFile;
use nrc_bridge::adapters::log_sink::LogEventSink;
use nrc_bridge::app::ports::ConfigPort;
use nrc_bridge::bridge::{self, Outcome};
use nrc_bridge::config::BridgeConfig;
use nrc_bridge::drivers::s826::MAX_BOARDS;
use nrc_bridge::shutdown::Shutdown;

#[derive(Parser, Debug)]
#[command(name = "nrc-bridge")]
#[command(about = "Forward Redis values to Sensoray 826 analog outputs", long_about = None)]
#[command(version)]
struct Args {
    /// Board number to drive
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..i64::from(MAX_BOARDS)))]
    board: u8,

    /// Path to JSON configuration file (defaults are used when absent)
    #[arg(short, long, value_name = "FILE", env = "NRC_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Redis URL, overrides the config file
    #[arg(long, value_name = "URL", env = "NRC_BRIDGE_REDIS")]
    redis: Option<String>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    info!("NRC bridge v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => JsonConfigFile::new(path)
            .load()
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            info!("No config file given, using defaults");
            BridgeConfig::default()
        }
    };
    if let Some(url) = &args.redis {
        config.store_url.clone_from(url);
        config.validate().context("--redis")?;
    }
    for b in &config.bindings {
        info!(
            "Binding: {} -> DAC{} ({}..={})",
            b.name, b.channel, b.min, b.max
        );
    }

    // ── 2. Shutdown signal ────────────────────────────────────
    // Installed before the board is opened so an early Ctrl-C still runs
    // the driver teardown.
    let shutdown = Shutdown::new();
    let handler = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Interrupt received, stopping");
        handler.trigger();
    })
    .context("installing Ctrl-C handler")?;

    // ── 3. Board, store and sampling loop ─────────────────────
    let mut sink = LogEventSink::new();
    let outcome = bridge::run(&config, args.board, &shutdown, &mut sink)?;

    match outcome {
        Outcome::BoardUnavailable(e) => {
            error!("{}", e);
            if let OpenError::NotFound { detected, .. } = e {
                if detected.is_empty() {
                    warn!("No 826 boards detected");
                }
                for found in detected.iter() {
                    info!("board {} detected. try \"nrc-bridge {}\"", found, found);
                }
            }
        }
        Outcome::SetupFailed(e) => error!("DAC setup failed: {}", e),
        // The event sink has already reported how the loop ended.
        Outcome::Finished(_) | Outcome::Interrupted => {}
    }

    Ok(ExitCode::from(outcome.exit_code()))
}

/// Initialize logging based on verbosity level.  `RUST_LOG` still wins.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}
