//! Session-scoped display state.
//!
//! A [`DisplaySession`] owns every per-session buffer: the rolling channel
//! histories, the ECG waveform window, the synthesizer and the filter chain.
//! The monitor loop mutates it in place via [`DisplaySession::ingest`]; the
//! display layer only ever sees the owned [`Frame`] snapshot returned by
//! [`DisplaySession::frame`], so the two can never alias the live buffers.

use crate::config::Config;
use crate::core::filters::{pad_front, FilterChain};
use crate::core::history::{Channel, SessionHistory};
use crate::core::waveform::{EcgMode, EcgSynthesizer, WaveformBuffer};
use crate::display::{ChannelSnapshot, Frame, Metrics};
use crate::source::types::Reading;
use chrono::{Local, Utc};
use uuid::Uuid;

/// Samples synthesized per cycle in sweep mode.
const SWEEP_SEGMENT_LEN: usize = 25;

/// All mutable state for one dashboard session.
///
/// Lives for the duration of the session; history starts empty and
/// repopulates from live fetches after a restart.
pub struct DisplaySession {
    id: Uuid,
    history: SessionHistory,
    waveform: WaveformBuffer,
    synth: EcgSynthesizer,
    filters: FilterChain,
    channels: crate::config::ChannelConfig,
    ecg_mode: EcgMode,
}

impl DisplaySession {
    /// Create a session from the monitor configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: SessionHistory::new(
                config.history.scalar_capacity,
                config.history.ecg_capacity,
            ),
            waveform: WaveformBuffer::new(config.history.ecg_capacity),
            synth: EcgSynthesizer::new(),
            filters: FilterChain::from_config(&config.filters),
            channels: config.channels.clone(),
            ecg_mode: config.ecg_mode,
        }
    }

    /// Unique session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Names of the configured filters, for startup output.
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.names()
    }

    /// Fold one reading into the session state.
    ///
    /// Appends to every channel (heart-rate samples become gaps when the
    /// sensor has no contact), refilters the accumulated heart-rate series,
    /// and advances the ECG trace.
    pub fn ingest(&mut self, reading: &Reading) {
        self.history
            .append_label(Local::now().format("%H:%M:%S").to_string());

        let contact = reading.has_finger;
        self.history
            .append(Channel::Temperature, Some(reading.temperature));
        self.history.append(
            Channel::HeartRate,
            contact.then(|| f64::from(reading.bpm)),
        );
        // The device keeps averaging across brief contact gaps, so the
        // average channel takes the raw value unconditionally.
        self.history
            .append(Channel::AvgHeartRate, Some(f64::from(reading.avg_bpm)));
        self.history
            .append(Channel::SpO2, Some(f64::from(reading.spo2)));

        self.refilter_heart_rate();
        self.advance_ecg(if contact { reading.bpm } else { 0 });
    }

    /// Recompute the filtered heart-rate channel from the accumulated series.
    fn refilter_heart_rate(&mut self) {
        let raw_len = self.history.get(Channel::HeartRate).len();
        if self.filters.is_empty() {
            self.history.replace(Channel::FilteredHeartRate, Vec::new());
            return;
        }

        let present = self.history.channel(Channel::HeartRate).present_samples();
        let filtered = self.filters.apply(&present);
        // Front-pad: the moving average drops the earliest samples, so the
        // filtered series aligns with the end of the raw series.
        self.history
            .replace(Channel::FilteredHeartRate, pad_front(&filtered, raw_len));
    }

    /// Advance the ECG trace by one cycle's worth of samples.
    fn advance_ecg(&mut self, bpm: u32) {
        match self.ecg_mode {
            EcgMode::Scalar => {
                let sample = self.synth.sample(bpm);
                self.history.append(Channel::Ecg, Some(sample));
                self.waveform.push(sample);
            }
            EcgMode::Sweep => {
                let segment = self.synth.segment(bpm, SWEEP_SEGMENT_LEN);
                self.waveform.shift_append(&segment);
            }
        }
    }

    /// Build the read-only snapshot handed to the display this cycle.
    ///
    /// `latest` is the reading that produced the current state; heart-rate
    /// metrics become `None` (placeholder) when it reports no contact.
    pub fn frame(&self, latest: &Reading) -> Frame {
        let contact = latest.has_finger;

        let mut channels = Vec::new();
        if self.channels.temperature {
            channels.push(self.snapshot(Channel::Temperature, None));
        }
        if self.channels.heart_rate {
            let filtered = (!self.filters.is_empty())
                .then(|| self.history.get(Channel::FilteredHeartRate).to_vec());
            channels.push(self.snapshot(Channel::HeartRate, filtered));
            channels.push(self.snapshot(Channel::AvgHeartRate, None));
        }
        if self.channels.spo2 {
            channels.push(self.snapshot(Channel::SpO2, None));
        }

        let ecg = if self.channels.ecg {
            self.waveform.samples().to_vec()
        } else {
            Vec::new()
        };

        Frame {
            generated_at: Utc::now(),
            labels: self.history.labels().to_vec(),
            metrics: Metrics {
                temperature: latest.temperature,
                bpm: contact.then_some(latest.bpm),
                avg_bpm: contact.then_some(latest.avg_bpm),
                spo2: contact.then_some(latest.spo2),
            },
            channels,
            ecg,
        }
    }

    fn snapshot(&self, channel: Channel, filtered: Option<Vec<Option<f64>>>) -> ChannelSnapshot {
        ChannelSnapshot {
            channel,
            samples: self.history.get(channel).to_vec(),
            filtered,
        }
    }

    /// The live session history (loop-side view).
    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Restart the session: drop all buffered samples.
    pub fn clear(&mut self) {
        self.history.clear();
        self.waveform.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn reading(bpm: u32, has_finger: bool) -> Reading {
        Reading {
            temperature: 36.5,
            bpm,
            avg_bpm: bpm,
            spo2: 98,
            has_finger,
            timestamp: 0.0,
        }
    }

    fn session_with_ma(window: usize) -> DisplaySession {
        let mut config = Config::default();
        config.filters.moving_average = true;
        config.filters.ma_window = window;
        DisplaySession::new(&config)
    }

    #[test]
    fn test_ingest_appends_all_channels() {
        let mut session = DisplaySession::new(&Config::default());
        session.ingest(&reading(72, true));

        assert_eq!(session.history().get(Channel::Temperature).len(), 1);
        assert_eq!(
            session.history().get(Channel::HeartRate),
            &[Some(72.0)]
        );
        assert_eq!(session.history().get(Channel::Ecg).len(), 1);
        assert_eq!(session.history().labels().len(), 1);
    }

    #[test]
    fn test_no_contact_leaves_heart_rate_gap() {
        let mut session = DisplaySession::new(&Config::default());
        session.ingest(&reading(0, false));

        assert_eq!(session.history().get(Channel::HeartRate), &[None]);
        // No contact synthesizes the flat branch.
        assert_eq!(session.history().get(Channel::Ecg), &[Some(0.0)]);
    }

    #[test]
    fn test_filtered_channel_front_padded_to_raw_length() {
        let mut session = session_with_ma(5);
        for _ in 0..5 {
            session.ingest(&reading(70, true));
        }

        let raw = session.history().get(Channel::HeartRate);
        let filtered = session.history().get(Channel::FilteredHeartRate);
        assert_eq!(raw.len(), 5);
        assert_eq!(filtered.len(), 5);
        // Window of 5 over 5 samples: exactly one value, at the end.
        assert_eq!(filtered[..4], [None, None, None, None]);
        assert_eq!(filtered[4], Some(70.0));
    }

    #[test]
    fn test_frame_metrics_placeholder_without_contact() {
        let mut session = DisplaySession::new(&Config::default());
        let r = reading(0, false);
        session.ingest(&r);
        let frame = session.frame(&r);

        assert_eq!(frame.metrics.bpm, None);
        assert_eq!(frame.metrics.avg_bpm, None);
        assert_eq!(frame.metrics.spo2, None);
        assert!((frame.metrics.temperature - 36.5).abs() < 1e-9);
    }

    #[test]
    fn test_frame_is_a_value_snapshot() {
        let mut session = DisplaySession::new(&Config::default());
        let r = reading(72, true);
        session.ingest(&r);
        let frame = session.frame(&r);

        // Mutating the session afterwards must not change the frame.
        session.ingest(&reading(80, true));
        let hr = frame.channel(Channel::HeartRate).expect("snapshot present");
        assert_eq!(hr.samples, vec![Some(72.0)]);
    }

    #[test]
    fn test_disabled_channels_excluded_from_frame() {
        let mut config = Config::default();
        config.channels.spo2 = false;
        config.channels.ecg = false;
        let mut session = DisplaySession::new(&config);

        let r = reading(72, true);
        session.ingest(&r);
        let frame = session.frame(&r);

        assert!(frame.channel(Channel::SpO2).is_none());
        assert!(frame.ecg.is_empty());
    }

    #[test]
    fn test_sweep_mode_fills_waveform_window() {
        let mut config = Config::default();
        config.ecg_mode = EcgMode::Sweep;
        let mut session = DisplaySession::new(&config);

        let r = reading(72, true);
        for _ in 0..4 {
            session.ingest(&r);
        }
        let frame = session.frame(&r);
        assert_eq!(frame.ecg.len(), 4 * 25);
    }

    #[test]
    fn test_clear_restarts_session() {
        let mut session = session_with_ma(3);
        for _ in 0..5 {
            session.ingest(&reading(70, true));
        }
        session.clear();

        assert!(session.history().get(Channel::HeartRate).is_empty());
        assert!(session.history().get(Channel::FilteredHeartRate).is_empty());
        assert!(session.history().labels().is_empty());
    }
}
