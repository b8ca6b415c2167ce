//! Display layer boundary.
//!
//! The monitor loop hands the display a read-only [`Frame`] snapshot once per
//! cycle. The frame owns its data (value copies of the session histories), so
//! nothing the display does can alias or mutate the live buffers.

use crate::core::history::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder shown for heart-rate metrics when the sensor has no contact.
pub const NO_CONTACT_PLACEHOLDER: &str = "--";

/// Latest scalar values for the metric row.
///
/// Heart-rate metrics are `None` when the sensor has no physical contact;
/// the display shows [`NO_CONTACT_PLACEHOLDER`] instead of a numeric zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub temperature: f64,
    pub bpm: Option<u32>,
    pub avg_bpm: Option<u32>,
    pub spo2: Option<u32>,
}

impl Metrics {
    /// Format an optional metric, substituting the no-contact placeholder.
    pub fn format(value: Option<u32>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => NO_CONTACT_PLACEHOLDER.to_string(),
        }
    }
}

/// One channel's plotted series: raw samples and, for the heart-rate channel,
/// the filtered series front-padded to the same length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub channel: Channel,
    pub samples: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Vec<Option<f64>>>,
}

/// Everything the display needs to render one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// When this frame was generated
    pub generated_at: DateTime<Utc>,
    /// Per-cycle time labels, oldest first (x axis for scalar channels)
    pub labels: Vec<String>,
    /// Latest scalar values for the metric row
    pub metrics: Metrics,
    /// Enabled scalar channels, in display order
    pub channels: Vec<ChannelSnapshot>,
    /// ECG trace window, oldest sample first
    pub ecg: Vec<f64>,
}

impl Frame {
    /// Find a channel's snapshot by name.
    pub fn channel(&self, channel: Channel) -> Option<&ChannelSnapshot> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Where frames and connectivity errors go.
///
/// The loop and the display share one thread of control; implementations are
/// plain synchronous renderers.
pub trait DisplaySink {
    /// Render one frame.
    fn render(&mut self, frame: &Frame);

    /// Show a user-visible error (connectivity loss) for the current cycle.
    fn show_error(&mut self, message: &str);
}

/// Terminal renderer: one metrics line per cycle plus a coarse ECG sparkline.
pub struct ConsoleDisplay {
    /// Whether to draw the ECG sparkline under the metrics line.
    show_ecg: bool,
}

impl ConsoleDisplay {
    pub fn new(show_ecg: bool) -> Self {
        Self { show_ecg }
    }

    /// Map the tail of the ECG window onto block characters.
    fn sparkline(samples: &[f64], width: usize) -> String {
        const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

        let tail = if samples.len() > width {
            &samples[samples.len() - width..]
        } else {
            samples
        };
        if tail.is_empty() {
            return String::new();
        }

        let min = tail.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = tail.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let span = (max - min).max(1e-9);

        tail.iter()
            .map(|&v| {
                let idx = (((v - min) / span) * (LEVELS.len() - 1) as f64).round() as usize;
                LEVELS[idx.min(LEVELS.len() - 1)]
            })
            .collect()
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DisplaySink for ConsoleDisplay {
    fn render(&mut self, frame: &Frame) {
        let label = frame
            .labels
            .last()
            .cloned()
            .unwrap_or_else(|| frame.generated_at.format("%H:%M:%S").to_string());

        println!(
            "[{}] Temp: {:.1} C | BPM: {} | Avg BPM: {} | SpO2: {} %",
            label,
            frame.metrics.temperature,
            Metrics::format(frame.metrics.bpm),
            Metrics::format(frame.metrics.avg_bpm),
            Metrics::format(frame.metrics.spo2),
        );

        if self.show_ecg && !frame.ecg.is_empty() {
            println!("  ECG: {}", Self::sparkline(&frame.ecg, 60));
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_placeholder() {
        assert_eq!(Metrics::format(Some(72)), "72");
        assert_eq!(Metrics::format(None), NO_CONTACT_PLACEHOLDER);
    }

    #[test]
    fn test_frame_channel_lookup() {
        let frame = Frame {
            generated_at: Utc::now(),
            labels: vec![],
            metrics: Metrics {
                temperature: 36.5,
                bpm: Some(72),
                avg_bpm: Some(70),
                spo2: Some(98),
            },
            channels: vec![ChannelSnapshot {
                channel: Channel::Temperature,
                samples: vec![Some(36.5)],
                filtered: None,
            }],
            ecg: vec![],
        };

        assert!(frame.channel(Channel::Temperature).is_some());
        assert!(frame.channel(Channel::SpO2).is_none());
    }

    #[test]
    fn test_sparkline_width_bound() {
        let samples: Vec<f64> = (0..200).map(|i| (i as f64 / 10.0).sin()).collect();
        let line = ConsoleDisplay::sparkline(&samples, 60);
        assert_eq!(line.chars().count(), 60);
    }

    #[test]
    fn test_sparkline_flat_input() {
        let line = ConsoleDisplay::sparkline(&[0.0; 10], 60);
        assert_eq!(line.chars().count(), 10);
    }
}
