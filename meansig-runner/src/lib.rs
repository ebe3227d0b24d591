//! meansig runner: job orchestration, loading, metrics, reporting.
//!
//! This crate builds on `meansig-core` to provide:
//! - Config loading (YAML or TOML) with presence and range validation
//! - CSV loading of the OHLCV table with structural validation
//! - The pipeline runner: stage sequencing, latency, error capture
//! - The metrics record (success/error shapes) and its JSON writer
//! - Run fingerprinting and tracing setup

pub mod config;
pub mod data_loader;
pub mod fingerprint;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::{load_config, ConfigError, ConfigFormat, SignalConfig};
pub use data_loader::{load_bars, read_bars, DataError};
pub use fingerprint::run_fingerprint;
pub use logging::{file_layer, init_tracing, LoggingError, WorkerGuard};
pub use metrics::{ErrorRecord, MetricsRecord, RunStatus, SuccessRecord};
pub use report::{render_json, write_metrics, ReportError};
pub use runner::{
    compute, run_pipeline, RunError, RunFailure, RunOutcome, RunPaths, SignalRun, Stage,
    EXIT_REPORT_FAILED, EXIT_RUN_FAILED, EXIT_SUCCESS,
};
