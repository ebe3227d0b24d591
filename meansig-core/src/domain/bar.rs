//! Bar: one row of the OHLCV input table.

use serde::{Deserialize, Serialize};

/// A single input row as consumed by the signal engine.
///
/// Only `close` takes part in the computation. The optional `timestamp` is the
/// row's label from the input file (if it has one) and is kept verbatim for
/// diagnostics; open/high/low/volume columns are not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: Option<String>,
    pub close: f64,
}

impl Bar {
    pub fn new(close: f64) -> Self {
        Self {
            timestamp: None,
            close,
        }
    }

    pub fn with_timestamp(timestamp: impl Into<String>, close: f64) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            close,
        }
    }

    /// Returns true if `close` is neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.close.is_finite()
    }
}

/// Build unlabeled bars from a slice of close prices.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes.iter().copied().map(Bar::new).collect()
}
