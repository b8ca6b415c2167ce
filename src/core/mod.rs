//! Core signal pipeline for the vital monitor.
//!
//! This module contains:
//! - Bounded rolling histories for the fixed channel set
//! - Smoothing filters (moving average, scalar Kalman estimator)
//! - Synthetic ECG waveform generation and the display waveform buffer

pub mod filters;
pub mod history;
pub mod waveform;

// Re-export commonly used types
pub use filters::{
    pad_front, FilterChain, KalmanEstimator, MovingAverage, SignalFilter,
    DEFAULT_OBSERVATION_NOISE, DEFAULT_PROCESS_NOISE,
};
pub use history::{Channel, ChannelHistory, SessionHistory, ECG_CAPACITY, SCALAR_CAPACITY};
pub use waveform::{EcgMode, EcgSynthesizer, WaveformBuffer};
