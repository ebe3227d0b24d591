//! Signal generation: close-above-rolling-mean.
//!
//! A bar is long (`1`) when its close is strictly above the trailing mean of
//! the last `window` closes, flat (`0`) otherwise. Bars inside the warmup
//! (`index < window - 1`) get no signal and are not counted.

pub mod engine;

pub use engine::{ComputationError, SignalSeries, SIGNAL_RATE_METRIC};
