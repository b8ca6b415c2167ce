//! Vital Monitor CLI
//!
//! Real-time vital-sign dashboard and relay server.

use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vital_monitor::{
    config::{ChannelConfig, Config},
    display::ConsoleDisplay,
    monitor::{Monitor, MonitorConfig},
    server::{self, ServerConfig},
    session::DisplaySession,
    source::{BlockingReadingClient, ReadingSource, SimulatedSource, SourceConfig},
    stats::create_shared_stats_with_persistence,
    VERSION,
};

#[derive(Parser)]
#[command(name = "vital-monitor")]
#[command(version = VERSION)]
#[command(about = "Real-time vital-sign monitoring dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard loop
    Start {
        /// Relay server base URL (overrides config)
        #[arg(long)]
        server_url: Option<String>,

        /// Update interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Channels to display (temperature, heart_rate, spo2, ecg, or all)
        #[arg(long, default_value = "all")]
        channels: String,

        /// Enable the moving-average filter
        #[arg(long)]
        moving_average: bool,

        /// Moving-average window size
        #[arg(long, default_value = "5")]
        ma_window: usize,

        /// Enable the Kalman estimator
        #[arg(long)]
        kalman: bool,

        /// Use simulated vitals instead of polling the relay
        #[arg(long)]
        simulate: bool,
    },

    /// Run the relay server
    Serve {
        /// Port to bind to
        #[arg(long, default_value = "5000")]
        port: u16,
    },

    /// Show configuration and cumulative statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            server_url,
            interval,
            channels,
            moving_average,
            ma_window,
            kalman,
            simulate,
        } => {
            cmd_start(
                server_url,
                interval,
                &channels,
                moving_average,
                ma_window,
                kalman,
                simulate,
            );
        }
        Commands::Serve { port } => {
            cmd_serve(port);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_start(
    server_url: Option<String>,
    interval: Option<u64>,
    channels: &str,
    moving_average: bool,
    ma_window: usize,
    kalman: bool,
    simulate: bool,
) {
    println!("Vital Monitor v{VERSION}");
    println!();

    // Load configuration and apply CLI overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(url) = server_url {
        config.server_url = url;
    }
    if let Some(secs) = interval {
        config.update_interval = Duration::from_secs(secs);
    }
    config.channels = ChannelConfig::from_csv(channels);
    config.filters.moving_average = moving_average;
    config.filters.ma_window = ma_window;
    config.filters.kalman = kalman;

    if !config.channels.any_enabled() {
        eprintln!("Error: At least one channel must be enabled");
        std::process::exit(1);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let session = DisplaySession::new(&config);
    println!("Session ID: {}", session.id());
    println!("  Update interval: {}s", config.update_interval.as_secs());
    println!(
        "  Filters: {}",
        if session.filter_names().is_empty() {
            "none".to_string()
        } else {
            session.filter_names().join(" -> ")
        }
    );

    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let monitor_config = MonitorConfig::from(&config);
    if simulate {
        println!("Source: simulated vitals");
        let source = SimulatedSource::new();
        run_monitor(source, session, stats.clone(), monitor_config, &running);
    } else {
        println!("Source: {}", config.server_url);
        let source = match BlockingReadingClient::new(SourceConfig::new(&config.server_url)) {
            Ok(client) => {
                match client.test_connection() {
                    Ok(true) => println!("Relay connection: OK"),
                    Ok(false) => eprintln!("Warning: Relay health check failed"),
                    Err(e) => eprintln!("Warning: Could not connect to relay: {e}"),
                }
                client
            }
            Err(e) => {
                eprintln!("Error creating reading client: {e}");
                std::process::exit(1);
            }
        };
        run_monitor(source, session, stats.clone(), monitor_config, &running);
    }

    // Final stats
    println!();
    println!("Stopping...");
    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save session stats: {e}");
    }
    println!();
    println!("{}", stats.summary());
}

fn run_monitor<S: ReadingSource>(
    source: S,
    session: DisplaySession,
    stats: vital_monitor::stats::SharedSessionStats,
    config: MonitorConfig,
    running: &AtomicBool,
) {
    let mut monitor = Monitor::new(source, ConsoleDisplay::default(), session, stats, config);
    monitor.run(running);
}

fn cmd_serve(port: u16) {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error creating runtime: {e}");
            std::process::exit(1);
        }
    };

    let result: anyhow::Result<()> = runtime.block_on(async {
        let (addr, shutdown_tx) = server::run(ServerConfig::new(port)).await?;
        println!("Relay server listening on http://{addr}");
        println!("  POST /api/data   - overwrite the latest reading");
        println!("  GET  /api/latest - fetch the latest reading");
        println!();
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Relay server error: {e}");
        std::process::exit(1);
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Vital Monitor Status");
    println!("====================");
    println!();

    println!("Configuration:");
    println!("  Relay server: {}", config.server_url);
    println!("  Update interval: {}s", config.update_interval.as_secs());
    println!("  Max retries: {}", config.max_retries);
    println!(
        "  Moving average: {} (window {})",
        if config.filters.moving_average {
            "enabled"
        } else {
            "disabled"
        },
        config.filters.ma_window
    );
    println!(
        "  Kalman estimator: {} (q={}, r={})",
        if config.filters.kalman {
            "enabled"
        } else {
            "disabled"
        },
        config.filters.process_noise,
        config.filters.observation_noise
    );
    println!(
        "  History capacity: {} scalar / {} ecg",
        config.history.scalar_capacity, config.history.ecg_capacity
    );
    println!();

    // Load and show cumulative stats if available
    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(fetched) = stats.get("readings_fetched") {
                    println!("  Readings fetched: {fetched}");
                }
                if let Some(failures) = stats.get("fetch_failures") {
                    println!("  Fetch attempts failed: {failures}");
                }
                if let Some(errors) = stats.get("connectivity_errors") {
                    println!("  Connectivity errors: {errors}");
                }
                if let Some(frames) = stats.get("frames_rendered") {
                    println!("  Frames rendered: {frames}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
