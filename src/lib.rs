//! Vital Monitor - real-time vital-sign monitoring pipeline.
//!
//! This library polls a relay server for the single most-recent vital-sign
//! reading (temperature, heart rate, SpO2, sensor contact), smooths the
//! heart-rate series with configurable filters, keeps bounded rolling
//! histories per channel, synthesizes an ECG-like trace from the heart rate,
//! and republishes a frame to a display layer on a fixed cadence. The relay
//! server itself (single overwrite-only slot between device and dashboard)
//! ships in the same crate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Vital Monitor                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐   ┌─────────┐ │
//! │  │  Source   │──▶│  Session  │──▶│ Filters  │──▶│  Frame  │ │
//! │  │ (relay /  │   │ (rolling  │   │ (MA /    │   │ (to     │ │
//! │  │ simulator)│   │ history)  │   │ Kalman)  │   │ display)│ │
//! │  └───────────┘   └───────────┘   └──────────┘   └─────────┘ │
//! │        │               │                                     │
//! │        ▼               ▼                                     │
//! │  ┌───────────┐   ┌───────────┐                               │
//! │  │   Stats   │   │ Waveform  │                               │
//! │  │   Log     │   │ (ECG)     │                               │
//! │  └───────────┘   └───────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use vital_monitor::config::Config;
//! use vital_monitor::display::ConsoleDisplay;
//! use vital_monitor::monitor::{Monitor, MonitorConfig};
//! use vital_monitor::session::DisplaySession;
//! use vital_monitor::source::{BlockingReadingClient, SourceConfig};
//! use vital_monitor::stats::create_shared_stats;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::default();
//! let source = BlockingReadingClient::new(SourceConfig::new(&config.server_url))
//!     .expect("Failed to create client");
//! let mut monitor = Monitor::new(
//!     source,
//!     ConsoleDisplay::default(),
//!     DisplaySession::new(&config),
//!     create_shared_stats(),
//!     MonitorConfig::from(&config),
//! );
//!
//! let running = AtomicBool::new(true);
//! monitor.run(&running);
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod monitor;
pub mod server;
pub mod session;
pub mod source;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{ChannelConfig, Config, ConfigError, FilterConfig, HistoryConfig};
pub use core::{
    pad_front, Channel, EcgMode, EcgSynthesizer, FilterChain, KalmanEstimator, MovingAverage,
    SessionHistory, SignalFilter, WaveformBuffer,
};
pub use display::{ConsoleDisplay, DisplaySink, Frame, Metrics};
pub use monitor::{Monitor, MonitorConfig, TickOutcome};
pub use session::DisplaySession;
pub use source::{
    BlockingReadingClient, Reading, ReadingClient, ReadingSource, SimulatedSource, SourceConfig,
    SourceError,
};
pub use stats::{create_shared_stats, SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
