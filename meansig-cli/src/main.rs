//! meansig CLI: run the rolling-mean signal job once.
//!
//! Reads a config and an OHLCV CSV, writes the metrics document to
//! `--output`, echoes it to stdout, and appends to `--log-file`.
//!
//! Exit status: 0 on success, 1 when the run failed (an error document was
//! written), 2 when the metrics document could not be written.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meansig_runner::{init_tracing, run_pipeline, RunPaths, WorkerGuard, EXIT_REPORT_FAILED};

#[derive(Parser)]
#[command(
    name = "meansig",
    about = "meansig: close-above-rolling-mean signal rate over an OHLCV table"
)]
struct Cli {
    /// Input CSV with a header row containing `close`.
    #[arg(long)]
    input: PathBuf,

    /// Job configuration (YAML, or TOML if the file ends in .toml).
    #[arg(long)]
    config: PathBuf,

    /// Where to write the metrics JSON document.
    #[arg(long)]
    output: PathBuf,

    /// Append-only run log.
    #[arg(long)]
    log_file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken log file must not stop the metrics document from being written.
    let guard = match setup_logging(&cli) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: {err:#}; continuing without the run log");
            None
        }
    };

    let paths = RunPaths {
        input: cli.input,
        config: cli.config,
        output: cli.output,
    };

    let code = match run_pipeline(&paths) {
        Ok(outcome) => {
            println!("{}", outcome.rendered);
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(EXIT_REPORT_FAILED)
        }
    };

    // Flush buffered log lines before exit.
    drop(guard);
    code
}

fn setup_logging(cli: &Cli) -> Result<WorkerGuard> {
    init_tracing(&cli.log_file)
        .with_context(|| format!("failed to set up logging to {}", cli.log_file.display()))
}
