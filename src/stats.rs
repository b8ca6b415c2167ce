//! Session statistics.
//!
//! Counts what the monitor loop did this session (fetches, failures,
//! rendered frames) without storing any reading content. Persisted as JSON
//! so the `status` command can show cumulative counters across sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current monitoring session.
#[derive(Debug)]
pub struct SessionStats {
    /// Readings fetched successfully
    readings_fetched: AtomicU64,
    /// Individual fetch attempts that failed
    fetch_failures: AtomicU64,
    /// Cycles that exhausted all retries
    connectivity_errors: AtomicU64,
    /// Frames handed to the display
    frames_rendered: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    /// Create a new stats log.
    pub fn new() -> Self {
        Self {
            readings_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            connectivity_errors: AtomicU64::new(0),
            frames_rendered: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a stats log with persistence.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        // Try to load existing counters
        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous session stats: {e}");
        }

        stats
    }

    /// Record a successful fetch.
    pub fn record_reading_fetched(&self) {
        self.readings_fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed fetch attempt.
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cycle that exhausted all retries.
    pub fn record_connectivity_error(&self) {
        self.connectivity_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame handed to the display.
    pub fn record_frame_rendered(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            readings_fetched: self.readings_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            connectivity_errors: self.connectivity_errors.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Readings fetched: {}\n\
             - Fetch attempts failed: {}\n\
             - Connectivity errors: {}\n\
             - Frames rendered: {}\n\
             - Session duration: {} seconds",
            stats.readings_fetched,
            stats.fetch_failures,
            stats.connectivity_errors,
            stats.frames_rendered,
            stats.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                readings_fetched: stats.readings_fetched,
                fetch_failures: stats.fetch_failures,
                connectivity_errors: stats.connectivity_errors,
                frames_rendered: stats.frames_rendered,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats = serde_json::from_str(&content)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

                self.readings_fetched
                    .store(persisted.readings_fetched, Ordering::Relaxed);
                self.fetch_failures
                    .store(persisted.fetch_failures, Ordering::Relaxed);
                self.connectivity_errors
                    .store(persisted.connectivity_errors, Ordering::Relaxed);
                self.frames_rendered
                    .store(persisted.frames_rendered, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.readings_fetched.store(0, Ordering::Relaxed);
        self.fetch_failures.store(0, Ordering::Relaxed);
        self.connectivity_errors.store(0, Ordering::Relaxed);
        self.frames_rendered.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub readings_fetched: u64,
    pub fetch_failures: u64,
    pub connectivity_errors: u64,
    pub frames_rendered: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Counter format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    readings_fetched: u64,
    fetch_failures: u64,
    connectivity_errors: u64,
    frames_rendered: u64,
    last_updated: DateTime<Utc>,
}

/// Shared session stats handle.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create a new shared stats log.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

/// Create a new shared stats log with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}
