//! The render/publish loop.
//!
//! A two-state machine driven on a fixed cadence: FETCHING pulls the latest
//! reading from the source (with bounded retries), RENDERING folds it into
//! the session and hands a frame to the display. Everything runs on one
//! thread; the only blocking operations are the fetch (bounded by its
//! per-attempt timeout) and the sleep between cycles. There is no drift
//! correction and no overlap of iterations.

use crate::display::DisplaySink;
use crate::session::DisplaySession;
use crate::source::types::{Reading, ReadingSource};
use crate::stats::SharedSessionStats;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Loop phases. The loop alternates FETCHING -> RENDERING indefinitely;
/// a failed cycle skips RENDERING and goes back to FETCHING after the sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Fetching,
    Rendering,
}

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A reading was fetched and a frame rendered.
    Rendered,
    /// All fetch attempts failed; a connectivity error was shown and the
    /// session state was left untouched.
    ConnectivityError,
}

/// Timing and retry parameters for the loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sleep between loop iterations
    pub update_interval: Duration,
    /// Fetch attempts per cycle
    pub max_retries: u32,
    /// Backoff between fetch attempts
    pub retry_backoff: Duration,
}

impl From<&crate::config::Config> for MonitorConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            update_interval: config.update_interval,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }
}

/// The monitor loop: source in, frames out.
pub struct Monitor<S: ReadingSource, D: DisplaySink> {
    source: S,
    display: D,
    session: DisplaySession,
    stats: SharedSessionStats,
    config: MonitorConfig,
    state: LoopState,
}

impl<S: ReadingSource, D: DisplaySink> Monitor<S, D> {
    pub fn new(
        source: S,
        display: D,
        session: DisplaySession,
        stats: SharedSessionStats,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            display,
            session,
            stats,
            config,
            state: LoopState::Fetching,
        }
    }

    /// Run until the flag is cleared (ctrl-c) with the configured cadence.
    pub fn run(&mut self, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            self.tick();
            thread::sleep(self.config.update_interval);
        }
    }

    /// Execute one fetch/render iteration (no sleep).
    ///
    /// Exposed so tests can drive the loop cycle by cycle.
    pub fn tick(&mut self) -> TickOutcome {
        self.state = LoopState::Fetching;

        match self.fetch_with_retry() {
            Some(reading) => {
                self.state = LoopState::Rendering;
                self.session.ingest(&reading);
                let frame = self.session.frame(&reading);
                self.display.render(&frame);
                self.stats.record_frame_rendered();
                TickOutcome::Rendered
            }
            None => {
                // One user-visible error per exhausted cycle, no history
                // update; the next tick resumes fetching.
                self.display
                    .show_error("could not reach the reading server");
                self.stats.record_connectivity_error();
                TickOutcome::ConnectivityError
            }
        }
    }

    /// Fetch with bounded retries and fixed backoff between attempts.
    fn fetch_with_retry(&mut self) -> Option<Reading> {
        let attempts = self.config.max_retries.max(1);
        for attempt in 1..=attempts {
            match self.source.fetch() {
                Ok(reading) => {
                    self.stats.record_reading_fetched();
                    return Some(reading);
                }
                Err(e) => {
                    self.stats.record_fetch_failure();
                    eprintln!("Fetch attempt {attempt}/{attempts} failed: {e}");
                    if attempt < attempts {
                        thread::sleep(self.config.retry_backoff);
                    }
                }
            }
        }
        None
    }

    /// The live session (loop-side view, for shutdown reporting).
    pub fn session(&self) -> &DisplaySession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::Frame;
    use crate::source::types::SourceError;
    use crate::stats::create_shared_stats;

    /// Source that replays a script of results.
    struct ScriptedSource {
        script: Vec<Result<Reading, SourceError>>,
    }

    impl ReadingSource for ScriptedSource {
        fn fetch(&mut self) -> Result<Reading, SourceError> {
            if self.script.is_empty() {
                return Err(SourceError::Network("script exhausted".to_string()));
            }
            self.script.remove(0)
        }
    }

    /// Display that records what it was handed.
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

    fn fast_config() -> MonitorConfig {
        MonitorConfig {
            update_interval: Duration::from_millis(0),
            max_retries: 3,
            retry_backoff: Duration::from_millis(0),
        }
    }

    fn ok_reading(bpm: u32) -> Result<Reading, SourceError> {
        Ok(Reading {
            temperature: 36.5,
            bpm,
            avg_bpm: bpm,
            spo2: 98,
            has_finger: true,
            timestamp: 0.0,
        })
    }

    fn timeout() -> Result<Reading, SourceError> {
        Err(SourceError::Network("timed out".to_string()))
    }

    #[test]
    fn test_successful_tick_renders_frame() {
        let source = ScriptedSource {
            script: vec![ok_reading(72)],
        };
        let stats = create_shared_stats();
        let mut monitor = Monitor::new(
            source,
            RecordingDisplay::default(),
            DisplaySession::new(&Config::default()),
            stats.clone(),
            fast_config(),
        );

        assert_eq!(monitor.tick(), TickOutcome::Rendered);
        assert_eq!(monitor.display.frames.len(), 1);
        assert_eq!(stats.snapshot().readings_fetched, 1);
        assert_eq!(stats.snapshot().frames_rendered, 1);
    }

    #[test]
    fn test_transient_failure_recovers_within_retries() {
        let source = ScriptedSource {
            script: vec![timeout(), ok_reading(72)],
        };
        let stats = create_shared_stats();
        let mut monitor = Monitor::new(
            source,
            RecordingDisplay::default(),
            DisplaySession::new(&Config::default()),
            stats.clone(),
            fast_config(),
        );

        assert_eq!(monitor.tick(), TickOutcome::Rendered);
        assert!(monitor.display.errors.is_empty());
        assert_eq!(stats.snapshot().fetch_failures, 1);
    }

    #[test]
    fn test_exhausted_retries_report_one_error_and_skip_update() {
        let source = ScriptedSource {
            script: vec![timeout(), timeout(), timeout(), ok_reading(72)],
        };
        let stats = create_shared_stats();
        let mut monitor = Monitor::new(
            source,
            RecordingDisplay::default(),
            DisplaySession::new(&Config::default()),
            stats.clone(),
            fast_config(),
        );

        // Three failures exhaust the retry bound: exactly one error shown,
        // no frame, no history update.
        assert_eq!(monitor.tick(), TickOutcome::ConnectivityError);
        assert_eq!(monitor.display.errors.len(), 1);
        assert!(monitor.display.frames.is_empty());
        assert!(monitor
            .session()
            .history()
            .get(crate::core::history::Channel::HeartRate)
            .is_empty());
        assert_eq!(stats.snapshot().connectivity_errors, 1);

        // The next cycle resumes fetching and succeeds.
        assert_eq!(monitor.tick(), TickOutcome::Rendered);
        assert_eq!(monitor.display.errors.len(), 1);
        assert_eq!(monitor.display.frames.len(), 1);
    }
}
