//! Smoothing filters for vital-sign series.
//!
//! Two interchangeable filters operate on a slice of accumulated samples and
//! return a smoothed series: a simple moving average and a scalar
//! linear-Gaussian (Kalman) estimator. Both define an explicit passthrough
//! policy for degenerate input instead of failing, so the display loop never
//! has to special-case short histories.

use crate::config::FilterConfig;

/// A smoothing transform over a channel's accumulated samples.
///
/// Implementations may return a series shorter than the input (the moving
/// average drops the earliest `window - 1` samples); callers align the output
/// with [`pad_front`] before pairing it with the raw series.
pub trait SignalFilter {
    /// Apply the filter to the accumulated samples.
    fn apply(&self, samples: &[f64]) -> Vec<f64>;

    /// Human-readable filter name for status output.
    fn name(&self) -> &'static str;
}

/// Simple moving average with valid-convolution semantics.
///
/// For input of length `n >= window` the output is the `n - window + 1`
/// means of each contiguous window. Shorter input is returned unchanged
/// (insufficient history, not an error).
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: usize,
}

impl MovingAverage {
    /// Create a moving average filter with the given window size.
    ///
    /// A window of zero is treated as one (identity).
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl SignalFilter for MovingAverage {
    fn apply(&self, samples: &[f64]) -> Vec<f64> {
        if samples.len() < self.window {
            return samples.to_vec();
        }

        samples
            .windows(self.window)
            .map(|w| w.iter().sum::<f64>() / self.window as f64)
            .collect()
    }

    fn name(&self) -> &'static str {
        "moving-average"
    }
}

/// Scalar linear-Gaussian estimator (Kalman filter with F = H = 1).
///
/// The underlying value is modeled as constant between observations plus
/// process noise, observed through noisier sensor readings. The default noise
/// parameters (`q = 0.1`, `r = 4.0`) reflect raw sensor readings being much
/// noisier than the assumed process drift.
///
/// The recursion per observation:
///
/// ```text
/// predict:  var += q
/// gain:     k = var / (var + r)
/// update:   mean += k * (obs - mean)
///           var = (1 - k) * var
/// ```
///
/// Output is one posterior mean per observation (same length as input).
/// Input shorter than two samples is returned unchanged.
#[derive(Debug, Clone)]
pub struct KalmanEstimator {
    /// Process-noise variance (q).
    process_noise: f64,
    /// Observation-noise variance (r).
    observation_noise: f64,
}

/// Default process-noise variance.
pub const DEFAULT_PROCESS_NOISE: f64 = 0.1;

/// Default observation-noise variance.
pub const DEFAULT_OBSERVATION_NOISE: f64 = 4.0;

impl KalmanEstimator {
    /// Create an estimator with explicit noise variances.
    pub fn new(process_noise: f64, observation_noise: f64) -> Self {
        Self {
            process_noise,
            observation_noise,
        }
    }

    pub fn process_noise(&self) -> f64 {
        self.process_noise
    }

    pub fn observation_noise(&self) -> f64 {
        self.observation_noise
    }

    /// Run the recursion, returning posterior means and final variance.
    ///
    /// Exposed separately so tests can assert on the variance trajectory.
    /// `samples` must be non-empty; [`SignalFilter::apply`] guards for it.
    pub fn filter_with_variance(&self, samples: &[f64]) -> (Vec<f64>, f64) {
        // Posterior initialized from the first observation.
        let mut mean = samples[0];
        let mut variance = 1.0;

        let mut means = Vec::with_capacity(samples.len());
        means.push(mean);

        for &obs in &samples[1..] {
            variance += self.process_noise;
            let gain = variance / (variance + self.observation_noise);
            mean += gain * (obs - mean);
            variance = (1.0 - gain) * variance;
            means.push(mean);
        }

        (means, variance)
    }
}

impl Default for KalmanEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE, DEFAULT_OBSERVATION_NOISE)
    }
}

impl SignalFilter for KalmanEstimator {
    fn apply(&self, samples: &[f64]) -> Vec<f64> {
        if samples.len() < 2 {
            return samples.to_vec();
        }
        self.filter_with_variance(samples).0
    }

    fn name(&self) -> &'static str {
        "kalman"
    }
}

/// An ordered composition of filters applied in sequence.
///
/// Which filters run (moving average first, then the estimator, either alone,
/// or neither) is a display-layer choice expressed in [`FilterConfig`], not
/// filter-internal logic.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn SignalFilter + Send>>,
}

impl FilterChain {
    /// Create an empty chain (identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from the configured filter enables.
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut chain = Self::new();
        if config.moving_average {
            chain.push(MovingAverage::new(config.ma_window));
        }
        if config.kalman {
            chain.push(KalmanEstimator::new(
                config.process_noise,
                config.observation_noise,
            ));
        }
        chain
    }

    /// Append a filter to the end of the chain.
    pub fn push(&mut self, filter: impl SignalFilter + Send + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Apply every filter in order.
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let mut current = samples.to_vec();
        for filter in &self.filters {
            current = filter.apply(&current);
        }
        current
    }

    /// Whether any filter is configured.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the configured filters, for status output.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

/// Align a (possibly shortened) filtered series with the raw series length.
///
/// The moving average drops the earliest `window - 1` samples, so the
/// filtered output lines up with the *end* of the raw series; missing leading
/// positions are filled with `None`.
pub fn pad_front(filtered: &[f64], target_len: usize) -> Vec<Option<f64>> {
    if filtered.len() >= target_len {
        // Filtered can only be shorter than raw, but guard against a
        // misconfigured caller by keeping the most recent values.
        return filtered[filtered.len() - target_len..]
            .iter()
            .copied()
            .map(Some)
            .collect();
    }

    let missing = target_len - filtered.len();
    std::iter::repeat(None)
        .take(missing)
        .chain(filtered.iter().copied().map(Some))
        .collect()
}
