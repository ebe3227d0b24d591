//! meansig core: domain types, the rolling-mean indicator, and the signal engine.
//!
//! This crate holds the pure computation of the job:
//! - `Bar`, the typed input row (close price plus optional label)
//! - The `Indicator` trait and the `Sma` rolling mean
//! - `SignalSeries`: close-above-mean signals, rows processed, signal rate
//!
//! Nothing here touches the filesystem or global state; loading and reporting
//! live in `meansig-runner`.

pub mod components;
pub mod domain;
pub mod indicators;
pub mod signals;

pub use domain::Bar;
pub use signals::{ComputationError, SignalSeries, SIGNAL_RATE_METRIC};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<indicators::Sma>();
        require_sync::<indicators::Sma>();
        require_send::<SignalSeries>();
        require_sync::<SignalSeries>();
        require_send::<ComputationError>();
        require_sync::<ComputationError>();
    }

    /// `Sma` is object-safe behind `dyn Indicator`.
    #[test]
    fn sma_is_usable_as_indicator_object() {
        let sma: Box<dyn components::Indicator> = Box::new(indicators::Sma::new(3));
        assert_eq!(sma.lookback(), 2);
        assert_eq!(sma.compute(&domain::bars_from_closes(&[1.0, 2.0, 3.0]))[2], 2.0);
    }
}
