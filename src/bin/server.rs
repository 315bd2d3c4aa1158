//! PitLog Server Binary
//!
//! Runs the recorder/player controller and the operator protocol server.

use std::thread;

use clap::Parser;
use crossbeam::channel;
use pitlog::config::LogSyncStrategy;
use pitlog::controller::Outbound;
use pitlog::network::Server;
use pitlog::session::SessionStore;
use pitlog::{Config, Controller};
use tracing_subscriber::{fmt, EnvFilter};

/// PitLog Server
#[derive(Parser, Debug)]
#[command(name = "pitlog-server")]
#[command(about = "Race session recorder and replayer")]
#[command(version)]
struct Args {
    /// Data directory holding recorded sessions
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Car identity owning the recorder
    #[arg(short, long, default_value = "pilot")]
    car: String,

    /// Milliseconds between two replayed events
    #[arg(short, long, default_value = "1")]
    tick_ms: u64,

    /// fsync the logs after this many appends (0 = every append)
    #[arg(short, long, default_value = "100")]
    sync_every: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pitlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("PitLog Server v{}", pitlog::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        0 => LogSyncStrategy::EveryWrite,
        count => LogSyncStrategy::EveryNEntries { count },
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .car_id(&args.car)
        .replay_tick_ms(args.tick_ms)
        .log_sync_strategy(sync_strategy)
        .max_connections(args.max_connections)
        .build();

    let store = match SessionStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    // Replayed events reach the same consumer live telemetry would; here
    // that consumer only logs them.
    let (downstream, replayed) = channel::unbounded::<Outbound>();
    let fan_out = thread::spawn(move || {
        for message in replayed {
            match message {
                Outbound::Event(event) => tracing::debug!(
                    category = %event.category(),
                    timestamp = event.timestamp(),
                    "Replayed event"
                ),
                Outbound::ReplayStopped { tag } => tracing::info!(tag = %tag, "Replay stopped"),
                Outbound::ReplayAborted { tag, reason } => {
                    tracing::warn!(tag = %tag, "Replay aborted: {}", reason)
                }
            }
        }
    });

    let controller = match Controller::spawn(&config, downstream) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to start controller: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Controller for car '{}' started", config.car_id);

    let server = match Server::bind(config, controller.handle(), store) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    drop(server);
    if let Err(e) = controller.shutdown() {
        tracing::error!("Controller shutdown failed: {}", e);
    }
    let _ = fan_out.join();

    tracing::info!("Server stopped");
}
