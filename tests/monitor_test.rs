//! End-to-end pipeline tests: scripted source through the monitor loop to a
//! recording display.

use std::time::Duration;
use vital_monitor::config::Config;
use vital_monitor::core::history::Channel;
use vital_monitor::display::{DisplaySink, Frame};
use vital_monitor::monitor::{Monitor, MonitorConfig, TickOutcome};
use vital_monitor::session::DisplaySession;
use vital_monitor::source::{Reading, ReadingSource, SourceError};
use vital_monitor::stats::create_shared_stats;

/// Source that replays a script of results, then keeps failing.
struct ScriptedSource {
    script: Vec<Result<Reading, SourceError>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Reading, SourceError>>) -> Self {
        Self { script }
    }
}

impl ReadingSource for ScriptedSource {
    fn fetch(&mut self) -> Result<Reading, SourceError> {
        if self.script.is_empty() {
            return Err(SourceError::Network("script exhausted".to_string()));
        }
        self.script.remove(0)
    }
}

/// Display that records every frame and error it is handed.
#[derive(Default)]
struct RecordingDisplay {
    frames: Vec<Frame>,
    errors: Vec<String>,
}

impl DisplaySink for RecordingDisplay {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

fn reading(bpm: u32, has_finger: bool) -> Result<Reading, SourceError> {
    Ok(Reading {
        temperature: 36.5,
        bpm,
        avg_bpm: bpm,
        spo2: 98,
        has_finger,
        timestamp: 0.0,
    })
}

fn timeout() -> Result<Reading, SourceError> {
    Err(SourceError::Network("timed out".to_string()))
}

fn fast_monitor_config() -> MonitorConfig {
    MonitorConfig {
        update_interval: Duration::from_millis(0),
        max_retries: 3,
        retry_backoff: Duration::from_millis(0),
    }
}

/// Scenario A: five readings at bpm 70 with a moving-average window of 5
/// leave exactly one filtered value and five raw values.
#[test]
fn test_moving_average_fills_after_window() {
    let mut config = Config::default();
    config.filters.moving_average = true;
    config.filters.ma_window = 5;

    let source = ScriptedSource::new((0..5).map(|_| reading(70, true)).collect());
    let stats = create_shared_stats();
    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&config),
        stats,
        fast_monitor_config(),
    );

    for _ in 0..5 {
        assert_eq!(monitor.tick(), TickOutcome::Rendered);
    }

    let raw = monitor.session().history().get(Channel::HeartRate);
    let filtered = monitor.session().history().get(Channel::FilteredHeartRate);

    assert_eq!(raw.len(), 5);
    assert_eq!(raw.iter().filter(|s| s.is_some()).count(), 5);

    // Front-padded to raw length; exactly one actual value, the mean of 5.
    assert_eq!(filtered.len(), 5);
    let values: Vec<f64> = filtered.iter().filter_map(|s| *s).collect();
    assert_eq!(values.len(), 1);
    assert!((values[0] - 70.0).abs() < 1e-9);
}

/// Scenario B: three consecutive fetch failures produce exactly one
/// connectivity error, no history update, and fetching resumes next cycle.
#[test]
fn test_connectivity_error_cycle() {
    let source = ScriptedSource::new(vec![
        timeout(),
        timeout(),
        timeout(),
        reading(72, true),
    ]);
    let stats = create_shared_stats();
    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&Config::default()),
        stats.clone(),
        fast_monitor_config(),
    );

    assert_eq!(monitor.tick(), TickOutcome::ConnectivityError);

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.connectivity_errors, 1);
    assert_eq!(snapshot.fetch_failures, 3);
    assert_eq!(snapshot.frames_rendered, 0);
    assert!(monitor.session().history().get(Channel::HeartRate).is_empty());

    // Next cycle recovers.
    assert_eq!(monitor.tick(), TickOutcome::Rendered);
    assert_eq!(stats.snapshot().frames_rendered, 1);
    assert_eq!(monitor.session().history().get(Channel::HeartRate).len(), 1);
}

/// Scenario C: a no-contact reading shows the placeholder (None) metric and
/// takes the flat ECG branch.
#[test]
fn test_no_contact_placeholder_and_flat_ecg() {
    let source = ScriptedSource::new(vec![reading(0, false)]);
    let stats = create_shared_stats();
    let mut display = RecordingDisplay::default();

    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&Config::default()),
        stats,
        fast_monitor_config(),
    );
    assert_eq!(monitor.tick(), TickOutcome::Rendered);

    // Re-render the frame into a local recorder for inspection.
    let last = monitor.session().history();
    assert_eq!(last.get(Channel::HeartRate), &[None]);
    assert_eq!(last.get(Channel::Ecg), &[Some(0.0)]);

    let frame = monitor.session().frame(&Reading {
        temperature: 36.5,
        bpm: 0,
        avg_bpm: 0,
        spo2: 0,
        has_finger: false,
        timestamp: 0.0,
    });
    display.render(&frame);

    let rendered = &display.frames[0];
    assert!(display.errors.is_empty());
    assert_eq!(rendered.metrics.bpm, None);
    assert_eq!(rendered.metrics.avg_bpm, None);
    assert_eq!(rendered.metrics.spo2, None);
    assert!(rendered.ecg.iter().all(|&v| v == 0.0));
}

/// Composed filters: moving average then Kalman over a noisy series keeps the
/// filtered channel aligned with the raw channel length.
#[test]
fn test_composed_filters_stay_aligned() {
    let mut config = Config::default();
    config.filters.moving_average = true;
    config.filters.ma_window = 3;
    config.filters.kalman = true;

    let bpms = [70, 74, 68, 72, 71, 75, 69, 73];
    let source = ScriptedSource::new(bpms.iter().map(|&b| reading(b, true)).collect());
    let stats = create_shared_stats();
    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&config),
        stats,
        fast_monitor_config(),
    );

    for _ in 0..bpms.len() {
        assert_eq!(monitor.tick(), TickOutcome::Rendered);
    }

    let raw = monitor.session().history().get(Channel::HeartRate);
    let filtered = monitor.session().history().get(Channel::FilteredHeartRate);
    assert_eq!(filtered.len(), raw.len());

    // Window of 3 drops two leading samples; the Kalman pass preserves length.
    assert_eq!(filtered[0], None);
    assert_eq!(filtered[1], None);
    assert!(filtered[2..].iter().all(|s| s.is_some()));
}

/// Long sessions never exceed the configured history capacities.
#[test]
fn test_history_bounded_over_long_session() {
    let config = Config::default();
    let source = ScriptedSource::new((0..150).map(|i| reading(60 + (i % 30), true)).collect());
    let stats = create_shared_stats();
    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&config),
        stats,
        fast_monitor_config(),
    );

    for _ in 0..150 {
        assert_eq!(monitor.tick(), TickOutcome::Rendered);
        let history = monitor.session().history();
        assert!(history.get(Channel::HeartRate).len() <= 30);
        assert!(history.get(Channel::Temperature).len() <= 30);
        assert!(history.get(Channel::Ecg).len() <= 100);
        assert!(history.labels().len() <= 30);
    }

    let history = monitor.session().history();
    assert_eq!(history.get(Channel::HeartRate).len(), 30);
    assert_eq!(history.get(Channel::Ecg).len(), 100);
}

/// Contact gaps keep the filtered series consistent: filtering runs over the
/// present samples only, then realigns to the full raw length.
#[test]
fn test_contact_gaps_filtered_over_present_samples() {
    let mut config = Config::default();
    config.filters.moving_average = true;
    config.filters.ma_window = 2;

    let source = ScriptedSource::new(vec![
        reading(70, true),
        reading(0, false),
        reading(74, true),
        reading(72, true),
    ]);
    let stats = create_shared_stats();
    let mut monitor = Monitor::new(
        source,
        RecordingDisplay::default(),
        DisplaySession::new(&config),
        stats,
        fast_monitor_config(),
    );

    for _ in 0..4 {
        assert_eq!(monitor.tick(), TickOutcome::Rendered);
    }

    let raw = monitor.session().history().get(Channel::HeartRate);
    assert_eq!(raw, &[Some(70.0), None, Some(74.0), Some(72.0)]);

    // Three present samples, window 2: two means, front-padded to 4 slots.
    let filtered = monitor.session().history().get(Channel::FilteredHeartRate);
    assert_eq!(filtered.len(), 4);
    let values: Vec<f64> = filtered.iter().filter_map(|s| *s).collect();
    assert_eq!(values, vec![72.0, 73.0]);
}
