//! Reads price histories from per-symbol CSV files.
//!
//! Each symbol lives in `<directory>/<symbol>.csv` with a header row. The
//! timestamp column may be called `timestamp`, `date`, `datetime` or `time`;
//! the price column `price`, `adj_close`, `adj close` or `close` (first match
//! wins, case-insensitive). Other columns are ignored.
//!
//! Timestamps are kept as the exchange's wall-clock time: an offset such as
//! `+05:30` is dropped rather than converted, so periods are bucketed in the
//! exchange's own calendar.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::{CoreError, PriceSeries};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const TIMESTAMP_COLUMNS: &[&str] = &["timestamp", "date", "datetime", "time"];
const PRICE_COLUMNS: &[&str] = &["price", "adj_close", "adj close", "close"];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no {column} column (expected one of: {expected})")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
        expected: String,
    },

    #[error("{path}, line {line}: {reason}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Invalid price series: {0}")]
    InvalidSeries(#[from] CoreError),
}

/// Inclusive calendar window applied to every series, so all histories share a common range.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    fn contains(&self, ts: DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day <= e)
    }
}

/// Loads every asset plus the benchmark from `directory`.
pub fn load_universe(
    directory: &Path,
    symbols: &[String],
    benchmark: &str,
    window: DateWindow,
) -> Result<(BTreeMap<String, PriceSeries>, PriceSeries), IngestError> {
    let mut assets = BTreeMap::new();
    for symbol in symbols {
        let series = load_series(directory, symbol, window)?;
        assets.insert(symbol.clone(), series);
    }
    let benchmark = load_series(directory, benchmark, window)?;
    Ok((assets, benchmark))
}

/// Loads one symbol's history from `<directory>/<symbol>.csv`.
pub fn load_series(directory: &Path, symbol: &str, window: DateWindow) -> Result<PriceSeries, IngestError> {
    let path = directory.join(format!("{symbol}.csv"));
    let csv_error = |source| IngestError::Csv {
        path: path.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(&path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let ts_col = find_column(&headers, TIMESTAMP_COLUMNS).ok_or_else(|| IngestError::MissingColumn {
        path: path.clone(),
        column: "timestamp",
        expected: TIMESTAMP_COLUMNS.join(", "),
    })?;
    let price_col = find_column(&headers, PRICE_COLUMNS).ok_or_else(|| IngestError::MissingColumn {
        path: path.clone(),
        column: "price",
        expected: PRICE_COLUMNS.join(", "),
    })?;

    let mut points: Vec<(DateTime<Utc>, f64)> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line());
        let invalid = |reason: String| IngestError::InvalidRow {
            path: path.clone(),
            line,
            reason,
        };

        let raw_ts = record.get(ts_col).unwrap_or_default();
        let raw_price = record.get(price_col).unwrap_or_default();
        // Providers leave the price blank on non-trading days.
        if raw_price.is_empty() {
            continue;
        }

        let ts = parse_timestamp(raw_ts).ok_or_else(|| invalid(format!("unrecognized timestamp '{raw_ts}'")))?;
        let price: f64 = raw_price
            .parse()
            .map_err(|_| invalid(format!("unrecognized price '{raw_price}'")))?;

        if window.contains(ts) {
            points.push((ts, price));
        }
    }

    // Stable sort keeps file order among equal timestamps, so the later row wins below.
    points.sort_by_key(|&(ts, _)| ts);
    let mut deduped: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(points.len());
    for (ts, price) in points {
        match deduped.last_mut() {
            Some(last) if last.0 == ts => last.1 = price,
            _ => deduped.push((ts, price)),
        }
    }

    tracing::debug!(symbol, path = %path.display(), observations = deduped.len(), "Loaded price series");
    Ok(PriceSeries::new(symbol, deduped)?)
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(candidate))
    })
}

/// Accepts RFC 3339 (with `T` or a space), `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD`.
///
/// Offset timestamps keep their local date and time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z"))
    {
        return Some(ts.naive_local().and_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}
