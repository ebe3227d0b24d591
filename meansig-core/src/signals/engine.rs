//! The signal engine: rolling mean, per-bar signal, signal rate.

use thiserror::Error;

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::Sma;

/// Name under which the signal rate is reported.
pub const SIGNAL_RATE_METRIC: &str = "signal_rate";

/// Errors raised while deriving signals from a loaded table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("window must be at least 1 (got {0})")]
    InvalidWindow(usize),

    #[error("no eligible rows: window {window} exceeds the {rows} available rows, signal rate is undefined")]
    NoEligibleRows { window: usize, rows: usize },

    #[error("rolling mean at index {index} is not finite")]
    NonFiniteMean { index: usize },
}

/// Rolling mean and signal series aligned 1:1 with the input bars.
#[derive(Debug, Clone)]
pub struct SignalSeries {
    window: usize,
    rolling_mean: Vec<f64>,
    signals: Vec<Option<u8>>,
}

impl SignalSeries {
    /// Compute the rolling mean over `window` bars and the signal for every
    /// bar whose window is complete.
    ///
    /// Fails when no bar has a complete window, since the signal rate would be
    /// undefined.
    pub fn compute(bars: &[Bar], window: usize) -> Result<Self, ComputationError> {
        if window == 0 {
            return Err(ComputationError::InvalidWindow(window));
        }
        if bars.len() < window {
            return Err(ComputationError::NoEligibleRows {
                window,
                rows: bars.len(),
            });
        }

        let sma = Sma::new(window);
        let rolling_mean = sma.compute(bars);
        let warmup = sma.lookback();

        let mut signals = vec![None; bars.len()];
        for (index, (bar, &mean)) in bars.iter().zip(&rolling_mean).enumerate().skip(warmup) {
            if !mean.is_finite() {
                return Err(ComputationError::NonFiniteMean { index });
            }
            signals[index] = Some(u8::from(bar.close > mean));
        }

        Ok(Self {
            window,
            rolling_mean,
            signals,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Rolling mean per bar; `NaN` during warmup.
    pub fn rolling_mean(&self) -> &[f64] {
        &self.rolling_mean
    }

    /// Signal per bar; `None` during warmup.
    pub fn signals(&self) -> &[Option<u8>] {
        &self.signals
    }

    /// Number of bars for which a signal was computed.
    pub fn rows_processed(&self) -> usize {
        self.signals.len() + 1 - self.window
    }

    /// Number of bars with signal `1`.
    pub fn long_count(&self) -> usize {
        self.signals.iter().filter(|s| **s == Some(1)).count()
    }

    /// Fraction of eligible bars with signal `1`, unrounded.
    pub fn signal_rate(&self) -> f64 {
        self.long_count() as f64 / self.rows_processed() as f64
    }
}
