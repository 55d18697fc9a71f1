//! Disha - GPS + IMU locator daemon
//!
//! Reads a JSON-lines sensor stream (one GPS fix or IMU sample per line),
//! fuses it on a single locator thread and writes one JSON pose per GPS
//! fix.
//!
//! ```bash
//! # stdin -> stdout with disha.toml (if present) or built-in defaults
//! disha < drive.jsonl > poses.jsonl
//!
//! # explicit files
//! disha --config disha.toml --input drive.jsonl --output poses.jsonl
//! ```
//!
//! Logs go to stderr; filter with `RUST_LOG` (default `disha=info`).
//!
//! Input is read on its own thread. Ctrl-C stops the locator thread within
//! one poll interval even if stdin is idle; poses already fused are flushed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use clap::Parser;
use crossbeam_channel::Sender;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use disha::{
    DishaError, JsonLinesSink, Locator, LocatorConfig, LocatorThread, Result, SensorMessage,
    read_messages,
};

const DEFAULT_CONFIG: &str = "disha.toml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (default: ./disha.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines sensor log, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// JSON-lines pose output, or "-" for stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Sensor channel capacity (the reader blocks when full)
    #[arg(long, default_value_t = 256)]
    channel_capacity: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("disha=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Disha v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "  Origin: lon={} lat={}",
        config.origin.longitude, config.origin.latitude
    );
    info!(
        "  Projection: {} m/deg lon, {} m/deg lat",
        config.projection.lon_to_m, config.projection.lat_to_m
    );
    info!(
        "  IMU noise floor: {}, jump threshold: {} m²",
        config.imu.noise_floor, config.fusion.jump_threshold_sq
    );

    // Setup signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| DishaError::Io(std::io::Error::other(e)))?;

    let writer: Box<dyn Write + Send> = if args.output == "-" {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(File::create(&args.output)?))
    };
    let locator = Locator::new(&config, JsonLinesSink::new(writer))?;

    let (tx, rx) = crossbeam_channel::bounded(args.channel_capacity.max(1));
    let handle = LocatorThread::new(locator, rx, Arc::clone(&running)).spawn()?;

    let input = if args.input == "-" {
        None
    } else {
        info!("Reading sensor log {}", args.input);
        Some(File::open(&args.input)?)
    };
    let reader_handle = spawn_reader(input, tx, Arc::clone(&running))?;

    match handle.join() {
        Ok(locator) => {
            let stats = locator.estimator().stats();
            if let Ok(json) = serde_json::to_string(&stats) {
                info!("Final stats: {}", json);
            }
            info!("Poses written: {}", locator.sink().written());
        }
        Err(e) => {
            error!("Locator thread panicked: {:?}", e);
            running.store(false, Ordering::Relaxed);
        }
    }

    // After end of input the reader is done; after Ctrl-C it may still be
    // blocked on stdin and is abandoned at exit.
    if running.load(Ordering::Relaxed) || reader_handle.is_finished() {
        match reader_handle.join() {
            Ok(sent) => info!("Input finished after {} messages", sent),
            Err(e) => error!("Reader thread panicked: {:?}", e),
        }
    }

    info!("Disha finished");
    Ok(())
}

/// Feed parsed messages into the locator channel from a separate thread, so
/// shutdown never waits on a blocking read. Returns the number sent.
fn spawn_reader(
    input: Option<File>,
    tx: Sender<SensorMessage>,
    running: Arc<AtomicBool>,
) -> Result<JoinHandle<u64>> {
    let handle = thread::Builder::new().name("reader".into()).spawn(move || {
        let reader: Box<dyn BufRead> = match input {
            Some(file) => Box::new(BufReader::new(file)),
            None => Box::new(std::io::stdin().lock()),
        };

        let mut sent = 0u64;
        for message in read_messages(reader) {
            if !running.load(Ordering::Relaxed) {
                break;
            }
            match message {
                Ok(message) => {
                    if tx.send(message).is_err() {
                        warn!("Locator thread exited early");
                        break;
                    }
                    sent += 1;
                }
                Err(e) => warn!("Skipping input: {}", e),
            }
        }
        sent
    })?;
    Ok(handle)
}

fn load_config(args: &Args) -> Result<LocatorConfig> {
    if let Some(path) = &args.config {
        info!("Loading configuration from {:?}", path);
        return LocatorConfig::load(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        info!("Loading configuration from {}", DEFAULT_CONFIG);
        LocatorConfig::load(default_path)
    } else {
        info!("Using default configuration");
        Ok(LocatorConfig::default())
    }
}
