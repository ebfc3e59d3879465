//! CSV bar loading.
//!
//! Expected header: `timestamp,open,high,low,close,volume`, timestamps in
//! RFC 3339 (`2024-03-15T09:00:00Z`). Rows must already be in time order;
//! the file is validated into a `PriceHistory` exactly as in-memory bars are.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{PriceBar, PriceHistory};
use crate::error::AnalysisError;

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read bars: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no bars in input")]
    Empty,

    #[error(transparent)]
    Invalid(#[from] AnalysisError),
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvBar> for PriceBar {
    fn from(r: CsvBar) -> Self {
        PriceBar::new(r.timestamp, r.open, r.high, r.low, r.close, r.volume)
    }
}

/// Load and validate bars for `symbol` from a CSV file.
pub fn read_bars_csv(path: &Path, symbol: &str) -> Result<PriceHistory, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_bars(file, symbol)
}

/// Load and validate bars from any CSV reader.
pub fn read_bars<R: Read>(reader: R, symbol: &str) -> Result<PriceHistory, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let bars = rdr
        .deserialize::<CsvBar>()
        .map(|row| row.map(PriceBar::from))
        .collect::<Result<Vec<_>, _>>()?;
    if bars.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(PriceHistory::new(symbol, bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
timestamp,open,high,low,close,volume
2024-03-15T09:00:00Z,1.1000,1.1012,1.0995,1.1010,1200
2024-03-15T09:05:00Z,1.1010,1.1025,1.1005,1.1022,900
2024-03-15T09:10:00Z,1.1022,1.1040,1.1018,1.1036,1500
";

    #[test]
    fn reads_file_into_history() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let history = read_bars_csv(file.path(), "EURUSD").unwrap();
        assert_eq!(history.symbol(), "EURUSD");
        assert_eq!(history.len(), 3);
        let last = history.last().unwrap();
        assert_eq!(last.close, 1.1036);
        assert_eq!(last.volume, 1500.0);
        assert_eq!(last.timestamp.to_rfc3339(), "2024-03-15T09:10:00+00:00");
    }

    #[test]
    fn header_only_is_empty() {
        let err = read_bars("timestamp,open,high,low,close,volume\n".as_bytes(), "X").unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }

    #[test]
    fn unordered_rows_are_invalid() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-03-15T09:05:00Z,1.1,1.2,1.0,1.1,1
2024-03-15T09:00:00Z,1.1,1.2,1.0,1.1,1
";
        let err = read_bars(csv.as_bytes(), "X").unwrap_err();
        assert!(matches!(
            err,
            DataError::Invalid(AnalysisError::UnorderedTimestamps { index: 1 })
        ));
    }

    #[test]
    fn bad_number_is_a_csv_error() {
        let csv = "\
timestamp,open,high,low,close,volume
2024-03-15T09:00:00Z,abc,1.2,1.0,1.1,1
";
        assert!(matches!(
            read_bars(csv.as_bytes(), "X").unwrap_err(),
            DataError::Csv(_)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_bars_csv(Path::new("/nonexistent/bars.csv"), "X").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bars.csv"));
    }
}
