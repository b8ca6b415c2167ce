//! Bounded rolling histories for vital-sign channels.
//!
//! Each channel keeps a fixed-capacity FIFO of samples; appending beyond
//! capacity evicts the oldest entries. The channel set is fixed at session
//! start (no ad-hoc channels), and the whole structure is owned by one
//! display session and mutated only by the monitor loop.

use serde::{Deserialize, Serialize};

/// Default capacity for scalar channels.
pub const SCALAR_CAPACITY: usize = 30;

/// Default capacity for the ECG waveform channel.
pub const ECG_CAPACITY: usize = 100;

/// The fixed set of vital-sign channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Temperature,
    HeartRate,
    FilteredHeartRate,
    AvgHeartRate,
    SpO2,
    Ecg,
}

impl Channel {
    /// All channels, in display order.
    pub const ALL: [Channel; 6] = [
        Channel::Temperature,
        Channel::HeartRate,
        Channel::FilteredHeartRate,
        Channel::AvgHeartRate,
        Channel::SpO2,
        Channel::Ecg,
    ];

    /// Stable lower-snake-case name for logs and exports.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::HeartRate => "heart_rate",
            Channel::FilteredHeartRate => "filtered_heart_rate",
            Channel::AvgHeartRate => "avg_heart_rate",
            Channel::SpO2 => "spo2",
            Channel::Ecg => "ecg",
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Temperature => 0,
            Channel::HeartRate => 1,
            Channel::FilteredHeartRate => 2,
            Channel::AvgHeartRate => 3,
            Channel::SpO2 => 4,
            Channel::Ecg => 5,
        }
    }
}

/// One channel's bounded sample history.
///
/// Samples are `Option<f64>`; `None` marks a cycle where the sensor had no
/// valid contact, so gaps stay visible in the plotted series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelHistory {
    samples: Vec<Option<f64>>,
    capacity: usize,
}

impl ChannelHistory {
    /// Create an empty history with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append one sample, evicting from the front while over capacity.
    pub fn append(&mut self, sample: Option<f64>) {
        self.samples.push(sample);
        while self.samples.len() > self.capacity {
            self.samples.remove(0);
        }
    }

    /// Replace the entire history, keeping only the newest `capacity` samples.
    ///
    /// Used for the filtered channel, which is recomputed wholesale each cycle.
    pub fn replace(&mut self, samples: Vec<Option<f64>>) {
        self.samples = samples;
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(..excess);
        }
    }

    /// The current ordered samples, oldest first.
    ///
    /// Not stable across further appends; callers snapshot if they need to
    /// hold the data past the current cycle.
    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// The non-null samples in order, for filtering.
    pub fn present_samples(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| *s).collect()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<Option<f64>> {
        self.samples.last().copied()
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

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// The fixed channel set plus per-cycle time labels for one display session.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    labels: Vec<String>,
    label_capacity: usize,
    channels: [ChannelHistory; 6],
}

impl SessionHistory {
    /// Create empty histories with the given scalar and ECG capacities.
    pub fn new(scalar_capacity: usize, ecg_capacity: usize) -> Self {
        let channels = Channel::ALL.map(|channel| {
            let capacity = match channel {
                Channel::Ecg => ecg_capacity,
                _ => scalar_capacity,
            };
            ChannelHistory::new(capacity)
        });

        Self {
            labels: Vec::new(),
            label_capacity: scalar_capacity.max(1),
            channels,
        }
    }

    /// Append one sample to a channel.
    pub fn append(&mut self, channel: Channel, sample: Option<f64>) {
        self.channels[channel.index()].append(sample);
    }

    /// Replace a channel's samples wholesale (filtered channel refresh).
    pub fn replace(&mut self, channel: Channel, samples: Vec<Option<f64>>) {
        self.channels[channel.index()].replace(samples);
    }

    /// Append the time label for the current cycle.
    pub fn append_label(&mut self, label: String) {
        self.labels.push(label);
        while self.labels.len() > self.label_capacity {
            self.labels.remove(0);
        }
    }

    /// Ordered samples for a channel, oldest first.
    pub fn get(&self, channel: Channel) -> &[Option<f64>] {
        self.channels[channel.index()].samples()
    }

    /// The backing history for a channel.
    pub fn channel(&self, channel: Channel) -> &ChannelHistory {
        &self.channels[channel.index()]
    }

    /// Per-cycle time labels, oldest first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Drop all samples and labels, restarting the session history.
    pub fn clear(&mut self) {
        self.labels.clear();
        for history in &mut self.channels {
            history.clear();
        }
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(SCALAR_CAPACITY, ECG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut history = ChannelHistory::new(5);
        history.append(Some(1.0));
        history.append(None);
        history.append(Some(3.0));

        assert_eq!(history.samples(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(history.latest(), Some(Some(3.0)));
    }

    #[test]
    fn test_fifo_eviction_law() {
        let mut history = ChannelHistory::new(3);
        for i in 0..50 {
            history.append(Some(i as f64));
            assert!(history.len() <= 3);
        }
        // Oldest evicted first.
        assert_eq!(
            history.samples(),
            &[Some(47.0), Some(48.0), Some(49.0)]
        );
    }

    #[test]
    fn test_present_samples_skips_gaps() {
        let mut history = ChannelHistory::new(10);
        history.append(Some(70.0));
        history.append(None);
        history.append(Some(72.0));

        assert_eq!(history.present_samples(), vec![70.0, 72.0]);
    }

    #[test]
    fn test_replace_truncates_from_front() {
        let mut history = ChannelHistory::new(3);
        history.replace(vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(history.samples(), &[Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_session_history_capacities() {
        let session = SessionHistory::new(30, 100);
        assert_eq!(session.channel(Channel::HeartRate).capacity(), 30);
        assert_eq!(session.channel(Channel::Ecg).capacity(), 100);
    }

    #[test]
    fn test_session_history_label_bound() {
        let mut session = SessionHistory::new(3, 10);
        for i in 0..10 {
            session.append_label(format!("t{i}"));
        }
        assert_eq!(session.labels(), &["t7", "t8", "t9"]);
    }

    #[test]
    fn test_session_history_clear() {
        let mut session = SessionHistory::default();
        session.append(Channel::Temperature, Some(36.5));
        session.append_label("12:00:00".to_string());
        session.clear();

        assert!(session.get(Channel::Temperature).is_empty());
        assert!(session.labels().is_empty());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::FilteredHeartRate.name(), "filtered_heart_rate");
        assert_eq!(Channel::SpO2.name(), "spo2");
    }
}
