//! Component traits.
//!
//! Indicators are pure functions over the bar series; the signal engine
//! consumes their precomputed output.

pub mod indicator;

pub use indicator::Indicator;
