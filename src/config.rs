//! Configuration for the vital monitor.

use crate::core::waveform::EcgMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the relay server to poll
    pub server_url: String,

    /// Sleep between loop iterations
    #[serde(with = "duration_serde")]
    pub update_interval: Duration,

    /// Fetch attempts before reporting a connectivity error
    pub max_retries: u32,

    /// Backoff between fetch attempts
    #[serde(with = "duration_serde")]
    pub retry_backoff: Duration,

    /// Which channels are shown on the dashboard
    pub channels: ChannelConfig,

    /// Heart-rate filter enables and parameters
    pub filters: FilterConfig,

    /// Rolling history capacities
    pub history: HistoryConfig,

    /// How the ECG trace is refreshed each cycle
    pub ecg_mode: EcgMode,

    /// Path for storing session statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vital-monitor");

        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            update_interval: Duration::from_secs(1),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            channels: ChannelConfig::default(),
            filters: FilterConfig::default(),
            history: HistoryConfig::default(),
            ecg_mode: EcgMode::default(),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vital-monitor")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Which channels are shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub temperature: bool,
    pub heart_rate: bool,
    pub spo2: bool,
    pub ecg: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            temperature: true,
            heart_rate: true,
            spo2: true,
            ecg: true,
        }
    }
}

impl ChannelConfig {
    /// Parse channel enables from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let names: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();
        let has = |name: &str| names.iter().any(|n| n == name || n == "all");

        Self {
            temperature: has("temperature"),
            heart_rate: has("heart_rate"),
            spo2: has("spo2"),
            ecg: has("ecg"),
        }
    }

    /// Check if at least one channel is enabled.
    pub fn any_enabled(&self) -> bool {
        self.temperature || self.heart_rate || self.spo2 || self.ecg
    }
}

/// Heart-rate filter enables and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Apply the moving average before the estimator
    pub moving_average: bool,
    /// Moving-average window size
    pub ma_window: usize,
    /// Apply the Kalman estimator
    pub kalman: bool,
    /// Process-noise variance (q)
    pub process_noise: f64,
    /// Observation-noise variance (r)
    pub observation_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            moving_average: false,
            ma_window: 5,
            kalman: false,
            process_noise: crate::core::filters::DEFAULT_PROCESS_NOISE,
            observation_noise: crate::core::filters::DEFAULT_OBSERVATION_NOISE,
        }
    }
}

impl FilterConfig {
    /// Check if any heart-rate filtering is enabled.
    pub fn any_enabled(&self) -> bool {
        self.moving_average || self.kalman
    }
}

/// Rolling history capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Capacity for scalar channels
    pub scalar_capacity: usize,
    /// Capacity for the ECG channel and waveform window
    pub ecg_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            scalar_capacity: crate::core::history::SCALAR_CAPACITY,
            ecg_capacity: crate::core::history::ECG_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_parsing() {
        let config = ChannelConfig::from_csv("temperature,heart_rate");
        assert!(config.temperature);
        assert!(config.heart_rate);
        assert!(!config.spo2);
        assert!(!config.ecg);

        let config = ChannelConfig::from_csv("all");
        assert!(config.any_enabled());
        assert!(config.ecg);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.update_interval, Duration::from_secs(1));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff, Duration::from_secs(1));
        assert_eq!(config.filters.ma_window, 5);
        assert!(!config.filters.any_enabled());
        assert_eq!(config.history.scalar_capacity, 30);
        assert_eq!(config.history.ecg_capacity, 100);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("serializes");
        let parsed: Config = serde_json::from_str(&json).expect("parses");
        assert_eq!(parsed.update_interval, config.update_interval);
        assert_eq!(parsed.server_url, config.server_url);
    }
}
