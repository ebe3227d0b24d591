//! Simple Moving Average (SMA).
//!
//! Trailing, unweighted mean of close prices over a fixed window.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        // Rolling sum. Re-anchored from a fresh window sum every `period`
        // bars and whenever the running sum is non-finite.
        let period = self.period;
        let divisor = period as f64;
        let window_sum = |end: usize| -> f64 {
            bars[end + 1 - period..=end].iter().map(|b| b.close).sum()
        };

        let mut sum: f64 = 0.0;
        for (i, slot) in result.iter_mut().enumerate().skip(self.lookback()) {
            let steps = i - self.lookback();
            if steps % period == 0 || !sum.is_finite() {
                sum = window_sum(i);
            } else {
                let leaving = bars[i - period].close;
                let entering = bars[i].close;
                sum = sum - leaving + entering;
            }
            *slot = sum / divisor;
        }

        result
    }
}
