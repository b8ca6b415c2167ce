//! Synthetic ECG waveform generation.
//!
//! When no waveform-capable device is attached, an ECG-like trace is
//! synthesized from the scalar heart rate: three gated sinusoids (P, QRS and
//! T components) summed over one cardiac cycle, plus small Gaussian noise.
//! A zero rate (no sensor contact) produces a flat trace, never a division
//! by zero.

use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

/// Samples per synthesized cycle.
const CYCLE_RESOLUTION: usize = 500;

/// Standard deviation of the additive noise.
const NOISE_STD: f64 = 0.05;

// Component amplitudes and frequencies (Hz).
const P_AMPLITUDE: f64 = 0.25;
const P_FREQ: f64 = 5.0;
const QRS_AMPLITUDE: f64 = 1.5;
const QRS_FREQ: f64 = 15.0;
const T_AMPLITUDE: f64 = 0.3;
const T_FREQ: f64 = 2.0;

// Gating boundaries as fractions of the cycle period. Chosen so the
// components occupy non-overlapping phases: P before QRS before T.
const P_END: f64 = 0.2;
const QRS_END: f64 = 0.25;
const T_START: f64 = 0.3;
const T_END: f64 = 0.45;

/// How the ECG trace is refreshed each display cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcgMode {
    /// One scalar sample appended to the trace per update (strip-chart).
    Scalar,
    /// A full segment synthesized and shifted into the buffer per update.
    Sweep,
}

impl Default for EcgMode {
    fn default() -> Self {
        EcgMode::Scalar
    }
}

/// Synthesizes ECG-like samples from a scalar heart rate.
pub struct EcgSynthesizer {
    noise: Normal,
}

impl EcgSynthesizer {
    pub fn new() -> Self {
        // Fixed valid parameters; construction cannot fail.
        let noise = Normal::new(0.0, NOISE_STD).expect("valid noise distribution");
        Self { noise }
    }

    /// One noise-free cycle of the waveform at the given rate.
    ///
    /// Returns all zeros when `bpm` is zero (no contact). Deterministic, so
    /// the shape itself is testable; the sampling entry points add noise.
    pub fn synthesize(&self, bpm: u32, len: usize) -> Vec<f64> {
        if bpm == 0 || len == 0 {
            return vec![0.0; len];
        }

        let heart_rate = f64::from(bpm) / 60.0;
        let period = 1.0 / heart_rate;

        (0..len)
            .map(|i| {
                // t spans one full cycle [0, period].
                let t = if len == 1 {
                    0.0
                } else {
                    period * i as f64 / (len - 1) as f64
                };
                component(t, P_AMPLITUDE, P_FREQ, 0.0, P_END * period)
                    + component(t, QRS_AMPLITUDE, QRS_FREQ, P_END * period, QRS_END * period)
                    + component(t, T_AMPLITUDE, T_FREQ, T_START * period, T_END * period)
            })
            .collect()
    }

    /// Scalar-per-update mode: the final sample of one cycle plus noise.
    ///
    /// Zero rate returns exactly 0.0 (flat no-signal trace).
    pub fn sample(&self, bpm: u32) -> f64 {
        if bpm == 0 {
            return 0.0;
        }

        let cycle = self.synthesize(bpm, CYCLE_RESOLUTION);
        let last = cycle.last().copied().unwrap_or(0.0);
        last + self.noise.sample(&mut rand::thread_rng())
    }

    /// Full-buffer mode: a segment of `len` samples with per-sample noise.
    ///
    /// Zero rate yields a flat-noise segment (baseline wander only).
    pub fn segment(&self, bpm: u32, len: usize) -> Vec<f64> {
        let mut rng = rand::thread_rng();
        self.synthesize(bpm, len)
            .into_iter()
            .map(|v| v + self.noise.sample(&mut rng))
            .collect()
    }
}

impl Default for EcgSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One gated sinusoid: non-zero only within `[gate_start, gate_end)`.
fn component(t: f64, amplitude: f64, freq: f64, gate_start: f64, gate_end: f64) -> f64 {
    if t >= gate_start && t < gate_end {
        amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()
    } else {
        0.0
    }
}

/// Fixed-length display window of waveform samples.
///
/// Updated by shift-and-append: the oldest `segment.len()` samples are
/// discarded and the new segment lands at the end, so the buffer length is
/// preserved once full.
#[derive(Debug, Clone)]
pub struct WaveformBuffer {
    samples: Vec<f64>,
    capacity: usize,
}

impl WaveformBuffer {
    /// Create an empty buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Shift out the oldest samples and append a new segment.
    ///
    /// Segments longer than the capacity keep only their newest samples.
    pub fn shift_append(&mut self, segment: &[f64]) {
        self.samples.extend_from_slice(segment);
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(..excess);
        }
    }

    /// Append a single sample (scalar mode).
    pub fn push(&mut self, sample: f64) {
        self.shift_append(&[sample]);
    }

    /// The current window, oldest sample first.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
