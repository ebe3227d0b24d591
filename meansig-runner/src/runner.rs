//! Pipeline runner: wires config, data, signals and reporting together.
//!
//! A run moves through
//! `Start → ConfigLoaded → DataLoaded → SignalComputed → Reported`.
//! Any failure before `Reported` short-circuits to an error record. Either
//! way exactly one metrics document is written and one summary line is
//! logged at `info`/`error`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

use meansig_core::domain::Bar;
use meansig_core::{ComputationError, SignalSeries};
use thiserror::Error;
use tracing::{debug, error, info, Level};

use crate::config::{load_config, ConfigError, SignalConfig};
use crate::data_loader::{load_bars, DataError};
use crate::fingerprint::run_fingerprint;
use crate::metrics::{MetricsRecord, RunStatus};
use crate::report::{write_metrics, ReportError};

/// Exit status of a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status when a pipeline stage failed and an error record was written.
pub const EXIT_RUN_FAILED: u8 = 1;
/// Exit status when the metrics document itself could not be written.
pub const EXIT_REPORT_FAILED: u8 = 2;

/// Errors from the runner.
///
/// The `Display` output becomes `error_message` in the error record.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("computation error: {0}")]
    Computation(#[from] ComputationError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Number of leading rows shown in the debug preview of the computed series.
const PREVIEW_ROWS: usize = 10;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Start,
    ConfigLoaded,
    DataLoaded,
    SignalComputed,
    Reported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::ConfigLoaded => "config_loaded",
            Stage::DataLoaded => "data_loaded",
            Stage::SignalComputed => "signal_computed",
            Stage::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// The file paths a run reads and writes. The log file is owned by the
/// subscriber, not the runner.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub config: PathBuf,
    pub output: PathBuf,
}

/// Everything a successful computation produced.
#[derive(Debug, Clone)]
pub struct SignalRun {
    pub config: SignalConfig,
    pub series: SignalSeries,
    pub latency_ms: u64,
    pub fingerprint: String,
}

/// A failed computation, with the stage it reached and the configured version
/// if the config had loaded.
#[derive(Debug)]
pub struct RunFailure {
    pub stage: Stage,
    pub version: Option<String>,
    pub error: RunError,
}

/// Result of a reported run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub record: MetricsRecord,
    /// The JSON document exactly as written to the output path.
    pub rendered: String,
    pub fingerprint: Option<String>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.record.is_success()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_RUN_FAILED
        }
    }
}

/// How far a computation got: the last stage reached and, once the config
/// has loaded, its version.
#[derive(Debug, Default)]
struct Progress {
    stage: Stage,
    version: Option<String>,
}

impl Progress {
    fn fail(self, error: RunError) -> RunFailure {
        RunFailure {
            stage: self.stage,
            version: self.version,
            error,
        }
    }
}

/// Run config loading, data loading and signal computation.
///
/// `latency_ms` spans data loading through signal computation only.
pub fn compute(paths: &RunPaths) -> Result<SignalRun, RunFailure> {
    let mut progress = Progress::default();
    compute_tracked(paths, &mut progress).map_err(|error| progress.fail(error))
}

fn compute_tracked(paths: &RunPaths, progress: &mut Progress) -> Result<SignalRun, RunError> {
    let config = load_config(&paths.config)?;
    progress.stage = Stage::ConfigLoaded;
    progress.version = Some(config.version.clone());
    debug!(
        stage = %progress.stage,
        seed = config.seed,
        window = config.window,
        version = %config.version,
        "config loaded"
    );

    let started = Instant::now();

    let bars = load_bars(&paths.input)?;
    progress.stage = Stage::DataLoaded;
    debug!(stage = %progress.stage, rows = bars.len(), "data loaded");

    let series = SignalSeries::compute(&bars, config.window)?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    progress.stage = Stage::SignalComputed;
    debug!(
        stage = %progress.stage,
        window = series.window(),
        rows_processed = series.rows_processed(),
        long_count = series.long_count(),
        "signals computed"
    );
    if tracing::enabled!(Level::DEBUG) {
        debug!(preview = %preview(&bars, &series, PREVIEW_ROWS), "series head");
    }

    let fingerprint = run_fingerprint(&config, &bars);
    Ok(SignalRun {
        config,
        series,
        latency_ms,
        fingerprint,
    })
}

/// Run `f` with fresh progress, turning both errors and panics into a
/// `RunFailure` that carries whatever progress `f` recorded.
fn guarded<F>(f: F) -> Result<SignalRun, RunFailure>
where
    F: FnOnce(&mut Progress) -> Result<SignalRun, RunError>,
{
    let mut progress = Progress::default();
    match panic::catch_unwind(AssertUnwindSafe(|| f(&mut progress))) {
        Ok(Ok(run)) => Ok(run),
        Ok(Err(error)) => Err(progress.fail(error)),
        Err(payload) => Err(progress.fail(RunError::Internal(panic_message(payload.as_ref())))),
    }
}

/// `label close=.. mean=..` for the first `rows` bars; the label is the row's
/// timestamp or its 0-based index, and warmup means print as `-`.
fn preview(bars: &[Bar], series: &SignalSeries, rows: usize) -> String {
    bars.iter()
        .zip(series.rolling_mean())
        .take(rows)
        .enumerate()
        .map(|(i, (bar, mean))| {
            let label = bar.timestamp.clone().unwrap_or_else(|| i.to_string());
            if mean.is_nan() {
                format!("{label} close={} mean=-", bar.close)
            } else {
                format!("{label} close={} mean={mean}", bar.close)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run the whole pipeline and write the metrics document.
///
/// Stage failures (and panics) become an error record; the only `Err` is a
/// failure to write that record.
pub fn run_pipeline(paths: &RunPaths) -> Result<RunOutcome, ReportError> {
    let run_started = Instant::now();
    debug!(stage = %Stage::Start, input = %paths.input.display(), "job started");

    let computed = guarded(|progress| compute_tracked(paths, progress));

    let (record, fingerprint) = match &computed {
        Ok(run) => (
            MetricsRecord::success(&run.config, &run.series, run.latency_ms),
            Some(run.fingerprint.clone()),
        ),
        Err(failure) => (
            MetricsRecord::error(failure.version.as_deref(), failure.error.to_string()),
            None,
        ),
    };

    let rendered = match write_metrics(&paths.output, &record) {
        Ok(rendered) => rendered,
        Err(err) => {
            error!(
                status = %RunStatus::Error,
                output = %paths.output.display(),
                error = %err,
                "failed to write metrics document"
            );
            return Err(err);
        }
    };

    match &record {
        MetricsRecord::Success(r) => info!(
            status = %r.status,
            stage = %Stage::Reported,
            version = %r.version,
            seed = r.seed,
            rows_processed = r.rows_processed,
            signal_rate = r.value,
            latency_ms = r.latency_ms,
            fingerprint = %fingerprint.as_deref().unwrap_or_default(),
            "run completed"
        ),
        MetricsRecord::Error(r) => error!(
            status = %r.status,
            failed_after = %computed.as_ref().err().map_or(Stage::Start, |f| f.stage),
            version = %r.version,
            elapsed_ms = u64::try_from(run_started.elapsed().as_millis()).unwrap_or(u64::MAX),
            error = %r.error_message,
            "run failed"
        ),
    }

    Ok(RunOutcome {
        record,
        rendered,
        fingerprint,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn paths(dir: &Path, config: &str, data: &str) -> RunPaths {
        RunPaths {
            config: write(dir, "config.yaml", config),
            input: write(dir, "data.csv", data),
            output: dir.join("metrics.json"),
        }
    }

    #[test]
    fn compute_reports_the_stage_reached() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "seed: 1\nwindow: 3\nversion: v9\n", "open\n1\n");

        let failure = compute(&p).unwrap_err();
        assert_eq!(failure.stage, Stage::ConfigLoaded);
        assert_eq!(failure.version.as_deref(), Some("v9"));
        assert!(matches!(failure.error, RunError::Data(DataError::MissingColumn(_))));
    }

    #[test]
    fn config_failure_has_no_version() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "seed: 1\nwindow: 0\nversion: v9\n", "close\n1\n");

        let failure = compute(&p).unwrap_err();
        assert_eq!(failure.stage, Stage::Start);
        assert_eq!(failure.version, None);
        assert!(matches!(failure.error, RunError::Config(ConfigError::InvalidWindow(0))));
    }

    #[test]
    fn computation_failure_after_data_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "seed: 1\nwindow: 5\nversion: v1\n", "close\n1\n2\n");

        let failure = compute(&p).unwrap_err();
        assert_eq!(failure.stage, Stage::DataLoaded);
        assert!(matches!(failure.error, RunError::Computation(_)));
        assert!(failure.error.to_string().starts_with("computation error: no eligible rows"));
    }

    #[test]
    fn exit_codes_follow_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_pipeline(&paths(dir.path(), "seed: 1\nwindow: 1\nversion: v1\n", "close\n1\n")).unwrap();
        assert_eq!(ok.exit_code(), EXIT_SUCCESS);
        assert!(ok.fingerprint.is_some());

        let failed = run_pipeline(&paths(dir.path(), "seed: 1\nwindow: 1\nversion: v1\n", "")).unwrap();
        assert_eq!(failed.exit_code(), EXIT_RUN_FAILED);
        assert!(failed.fingerprint.is_none());
    }

    #[test]
    fn panic_before_config_reports_unknown_version() {
        let failure = guarded(|_| panic!("config reader blew up")).unwrap_err();
        assert_eq!(failure.stage, Stage::Start);
        assert_eq!(failure.version, None);
        assert_eq!(failure.error.to_string(), "internal error: config reader blew up");

        let record = MetricsRecord::error(failure.version.as_deref(), failure.error.to_string());
        assert_eq!(record.version(), "unknown");
    }

    #[test]
    fn panic_after_config_keeps_configured_version() {
        let failure = guarded(|progress| {
            progress.stage = Stage::DataLoaded;
            progress.version = Some("v7".to_string());
            panic!("indicator blew up");
        })
        .unwrap_err();

        assert_eq!(failure.stage, Stage::DataLoaded);
        assert_eq!(failure.version.as_deref(), Some("v7"));
        assert!(matches!(failure.error, RunError::Internal(ref m) if m == "indicator blew up"));

        let record = MetricsRecord::error(failure.version.as_deref(), failure.error.to_string());
        assert_eq!(record.version(), "v7");
    }

    #[test]
    fn guarded_errors_carry_progress() {
        let failure = guarded(|progress| {
            progress.stage = Stage::ConfigLoaded;
            progress.version = Some("v2".to_string());
            Err(RunError::Computation(ComputationError::InvalidWindow(0)))
        })
        .unwrap_err();
        assert_eq!(failure.stage, Stage::ConfigLoaded);
        assert_eq!(failure.version.as_deref(), Some("v2"));
    }

    #[test]
    fn preview_shows_leading_rows_with_warmup_dashes() {
        let bars = vec![
            Bar::with_timestamp("2024-01-01", 1.0),
            Bar::with_timestamp("2024-01-02", 2.0),
            Bar::with_timestamp("2024-01-03", 4.5),
        ];
        let series = SignalSeries::compute(&bars, 2).unwrap();

        assert_eq!(
            preview(&bars, &series, PREVIEW_ROWS),
            "2024-01-01 close=1 mean=-; 2024-01-02 close=2 mean=1.5; 2024-01-03 close=4.5 mean=3.25"
        );
    }

    #[test]
    fn preview_stops_at_row_limit_and_falls_back_to_index() {
        let bars = meansig_core::domain::bars_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let series = SignalSeries::compute(&bars, 1).unwrap();
        assert_eq!(preview(&bars, &series, 2), "0 close=1 mean=1; 1 close=2 mean=2");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let from_str: Box<dyn Any + Send> = Box::new("boom");
        let from_string: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(7_u32);

        assert_eq!(panic_message(from_str.as_ref()), "boom");
        assert_eq!(panic_message(from_string.as_ref()), "bang");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
