//! The metrics record: the single document a run produces.
//!
//! Two shapes share one output path:
//!
//! ```json
//! {"version": "v1", "rows_processed": 6, "metric": "signal_rate",
//!  "value": 0.5, "latency_ms": 3, "seed": 42, "status": "success"}
//!
//! {"version": "v1", "status": "error", "error_message": "..."}
//! ```
//!
//! A record is either fully successful or an error; the numeric fields never
//! appear next to `"status": "error"`.

use std::fmt;

use meansig_core::{SignalSeries, SIGNAL_RATE_METRIC};
use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;

/// Version reported in error records when the configuration never loaded.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Decimal places kept in the reported signal rate.
pub const VALUE_DECIMALS: i32 = 4;

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => f.write_str("success"),
            RunStatus::Error => f.write_str("error"),
        }
    }
}

/// Fields of a successful run, in output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessRecord {
    pub version: String,
    pub rows_processed: usize,
    pub metric: String,
    pub value: f64,
    pub latency_ms: u64,
    pub seed: i64,
    pub status: RunStatus,
}

/// Fields of a failed run, in output order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub version: String,
    pub status: RunStatus,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricsRecord {
    Success(SuccessRecord),
    Error(ErrorRecord),
}

impl MetricsRecord {
    /// Build the success record from a computed series.
    pub fn success(config: &SignalConfig, series: &SignalSeries, latency_ms: u64) -> Self {
        MetricsRecord::Success(SuccessRecord {
            version: config.version.clone(),
            rows_processed: series.rows_processed(),
            metric: SIGNAL_RATE_METRIC.to_string(),
            value: round_to(series.signal_rate(), VALUE_DECIMALS),
            latency_ms,
            seed: config.seed,
            status: RunStatus::Success,
        })
    }

    /// Build the error record. `version` is `None` when the failure happened
    /// before the configuration was loaded.
    pub fn error(version: Option<&str>, message: impl Into<String>) -> Self {
        MetricsRecord::Error(ErrorRecord {
            version: version.unwrap_or(UNKNOWN_VERSION).to_string(),
            status: RunStatus::Error,
            error_message: message.into(),
        })
    }

    pub fn status(&self) -> RunStatus {
        match self {
            MetricsRecord::Success(r) => r.status,
            MetricsRecord::Error(r) => r.status,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            MetricsRecord::Success(r) => &r.version,
            MetricsRecord::Error(r) => &r.version,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == RunStatus::Success
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use meansig_core::domain::bars_from_closes;

    fn config() -> SignalConfig {
        SignalConfig {
            seed: 42,
            window: 5,
            version: "v1".into(),
        }
    }

    #[test]
    fn success_record_from_series() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 1.0, 1.0, 1.0]);
        let series = SignalSeries::compute(&bars, 5).unwrap();
        let record = MetricsRecord::success(&config(), &series, 12);

        match &record {
            MetricsRecord::Success(r) => {
                assert_eq!(r.version, "v1");
                assert_eq!(r.rows_processed, 6);
                assert_eq!(r.metric, "signal_rate");
                assert_eq!(r.value, 0.5);
                assert_eq!(r.latency_ms, 12);
                assert_eq!(r.seed, 42);
            }
            MetricsRecord::Error(_) => panic!("expected success"),
        }
        assert!(record.is_success());
    }

    #[test]
    fn success_json_has_fixed_key_order() {
        let bars = bars_from_closes(&[1.0, 3.0, 2.0]);
        let series = SignalSeries::compute(&bars, 2).unwrap();
        let json = serde_json::to_string(&MetricsRecord::success(&config(), &series, 0)).unwrap();
        assert_eq!(
            json,
            r#"{"version":"v1","rows_processed":2,"metric":"signal_rate","value":0.5,"latency_ms":0,"seed":42,"status":"success"}"#
        );
    }

    #[test]
    fn error_json_has_no_numeric_fields() {
        let record = MetricsRecord::error(Some("v1"), "missing required column: close");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"version":"v1","status":"error","error_message":"missing required column: close"}"#
        );
    }

    #[test]
    fn error_without_config_reports_unknown_version() {
        let record = MetricsRecord::error(None, "configuration file not found: x.yaml");
        assert_eq!(record.version(), "unknown");
        assert_eq!(record.status(), RunStatus::Error);
    }

    #[test]
    fn records_deserialize_to_the_right_shape() {
        let ok: MetricsRecord = serde_json::from_str(
            r#"{"version":"v1","rows_processed":6,"metric":"signal_rate","value":0.5,"latency_ms":1,"seed":42,"status":"success"}"#,
        )
        .unwrap();
        assert!(ok.is_success());

        let err: MetricsRecord =
            serde_json::from_str(r#"{"version":"unknown","status":"error","error_message":"boom"}"#)
                .unwrap();
        assert!(!err.is_success());
    }

    #[test]
    fn rate_is_rounded_to_four_places() {
        assert_eq!(round_to(1.0 / 3.0, 4), 0.3333);
        assert_eq!(round_to(2.0 / 3.0, 4), 0.6667);
        assert_eq!(round_to(0.5, 4), 0.5);
        assert_eq!(round_to(1.0, 4), 1.0);
    }

    #[test]
    fn status_display_matches_serialized_form() {
        assert_eq!(RunStatus::Success.to_string(), "success");
        assert_eq!(
            serde_json::to_string(&RunStatus::Error).unwrap(),
            r#""error""#
        );
    }
}
