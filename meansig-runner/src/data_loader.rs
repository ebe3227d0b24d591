//! CSV loading for the OHLCV input table.
//!
//! The file must have a header row containing `close`. Every data row must
//! carry a finite numeric close; other columns are ignored except for an
//! optional row label (`timestamp`, `datetime`, `date` or `time`, first match
//! wins) which is kept on the bar. Row order is preserved.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use meansig_core::domain::Bar;
use thiserror::Error;

/// Name of the only column the signal engine consumes.
pub const CLOSE_COLUMN: &str = "close";

/// Candidate names for the row-label column, in priority order.
const LABEL_COLUMNS: [&str; 4] = ["timestamp", "datetime", "date", "time"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read input {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("input file is empty")]
    Empty,

    #[error("invalid CSV format: {0}")]
    Malformed(String),

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: close value {value:?} is not numeric")]
    NonNumeric { row: usize, value: String },

    #[error("row {row}: close value {value} is not finite")]
    NonFinite { row: usize, value: f64 },
}

/// Load bars from the CSV file at `path`.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
        _ => DataError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    read_bars(file)
}

/// Parse bars from any CSV byte source.
///
/// Row numbers in errors are 1-based and count data rows only (the header is
/// not row 1).
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DataError::Malformed(e.to_string()))?
        .clone();
    if headers.iter().all(str::is_empty) {
        return Err(DataError::Empty);
    }

    let records = rdr
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DataError::Malformed(e.to_string()))?;
    if records.is_empty() {
        return Err(DataError::Empty);
    }

    let close_idx = headers
        .iter()
        .position(|h| h == CLOSE_COLUMN)
        .ok_or(DataError::MissingColumn(CLOSE_COLUMN))?;
    let label_idx = LABEL_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name));

    records
        .iter()
        .enumerate()
        .map(|(i, record)| -> Result<Bar, DataError> {
            let row = i + 1;
            let raw = record.get(close_idx).unwrap_or_default();
            let close: f64 = raw.parse().map_err(|_| DataError::NonNumeric {
                row,
                value: raw.to_string(),
            })?;
            let timestamp = label_idx
                .and_then(|idx| record.get(idx))
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let bar = Bar { timestamp, close };
            if !bar.is_finite() {
                return Err(DataError::NonFinite { row, value: close });
            }
            Ok(bar)
        })
        .collect()
}
