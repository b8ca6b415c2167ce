//! Reading record and source abstraction.
//!
//! A [`Reading`] is one sample from the relay server. Every field carries a
//! serde default so a partial or malformed payload deserializes to zero
//! values instead of propagating an error - the dashboard keeps running on
//! whatever the device managed to send.

use chrono::Utc;
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

/// One vital-sign sample as served by the relay.
///
/// Field names match the device wire format. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Body temperature in degrees Celsius.
    #[serde(default)]
    pub temperature: f64,
    /// Instantaneous heart rate in beats per minute.
    #[serde(default)]
    pub bpm: u32,
    /// Device-side running average heart rate.
    #[serde(default)]
    pub avg_bpm: u32,
    /// Blood-oxygen saturation percentage.
    #[serde(default)]
    pub spo2: u32,
    /// Whether the sensor has valid physical contact.
    #[serde(default)]
    pub has_finger: bool,
    /// Unix timestamp (seconds) assigned by the relay on ingest.
    #[serde(default)]
    pub timestamp: f64,
}

impl Reading {
    /// A zero-valued reading, substituted when the source payload is empty.
    pub fn zero() -> Self {
        Self {
            temperature: 0.0,
            bpm: 0,
            avg_bpm: 0,
            spo2: 0,
            has_finger: false,
            timestamp: 0.0,
        }
    }

    /// Stamp the reading with the current wall-clock time.
    pub fn stamped_now(mut self) -> Self {
        self.timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;
        self
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::zero()
    }
}

/// Errors from a reading source.
#[derive(Debug)]
pub enum SourceError {
    /// Configuration error (bad URL, client construction)
    Config(String),
    /// Network/timeout error
    Network(String),
    /// Server returned a non-success status
    Status { status: u16 },
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Config(msg) => write!(f, "Source config error: {msg}"),
            SourceError::Network(msg) => write!(f, "Source network error: {msg}"),
            SourceError::Status { status } => {
                write!(f, "Source returned status {status}")
            }
            SourceError::Decode(msg) => write!(f, "Source decode error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A producer of readings for the monitor loop.
///
/// The loop only needs "fetch the latest reading"; whether samples come from
/// the relay server or a simulator is invisible to it.
pub trait ReadingSource {
    /// Fetch the most recent reading.
    fn fetch(&mut self) -> Result<Reading, SourceError>;
}

/// Generates plausible vitals without any hardware attached.
///
/// Used by `--simulate` for development and demos: temperature wanders around
/// 36.5 degrees C, heart rate sits in the resting range, SpO2 stays high.
pub struct SimulatedSource<R: Rng> {
    rng: R,
    temperature_noise: Normal,
    /// Running average of emitted heart rates.
    avg_bpm: f64,
    samples: u64,
}

impl SimulatedSource<rand::rngs::ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for SimulatedSource<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSource<R> {
    /// Create a simulator over an explicit RNG (deterministic in tests).
    pub fn with_rng(rng: R) -> Self {
        let temperature_noise = Normal::new(0.0, 0.5).expect("valid noise distribution");
        Self {
            rng,
            temperature_noise,
            avg_bpm: 0.0,
            samples: 0,
        }
    }
}

impl<R: Rng> ReadingSource for SimulatedSource<R> {
    fn fetch(&mut self) -> Result<Reading, SourceError> {
        let bpm = self.rng.gen_range(60..100);
        self.samples += 1;
        self.avg_bpm += (f64::from(bpm) - self.avg_bpm) / self.samples as f64;

        let temperature = 36.5 + self.temperature_noise.sample(&mut self.rng);

        Ok(Reading {
            temperature: (temperature * 10.0).round() / 10.0,
            bpm,
            avg_bpm: self.avg_bpm.round() as u32,
            spo2: self.rng.gen_range(95..100),
            has_finger: true,
            timestamp: 0.0,
        }
        .stamped_now())
    }
}
