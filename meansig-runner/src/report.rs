//! Metrics document writer.
//!
//! Renders a [`MetricsRecord`] as pretty JSON with a 4-space indent and
//! writes it to the configured output path, replacing any previous document.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::metrics::MetricsRecord;

/// Errors from rendering or persisting the metrics document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize metrics record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("metrics document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("failed to write metrics document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Render the record as pretty JSON (4-space indent, no trailing newline).
pub fn render_json(record: &MetricsRecord) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Render and write the record to `path`, creating parent directories.
///
/// Returns the rendered document so callers can echo it.
pub fn write_metrics(path: &Path, record: &MetricsRecord) -> Result<String, ReportError> {
    let rendered = render_json(record)?;
    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(rendered.as_bytes()).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    Ok(rendered)
}
