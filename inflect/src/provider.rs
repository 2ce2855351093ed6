use crate::{Data, TimeSeries};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source of daily closing prices.
pub trait PriceProvider {
  /// Closes for `ticker` with timestamps (UNIX ms) strictly between `start` and `end` when given.
  fn closes(&self, ticker: &str, start: Option<i64>, end: Option<i64>) -> anyhow::Result<TimeSeries>;
}

/// UNIX ms timestamp `years` years (of 365 days) before now.
/// Fails when that lies outside the representable date range.
pub fn lookback_start(years: u32) -> anyhow::Result<i64> {
  let span = TimeDelta::try_days(years as i64 * 365)
    .ok_or_else(|| anyhow::anyhow!("Lookback of {} years is out of range", years))?;
  let start = Utc::now()
    .checked_sub_signed(span)
    .ok_or_else(|| anyhow::anyhow!("Lookback of {} years is out of range", years))?;
  Ok(start.timestamp_millis())
}

fn parse_date(field: &str) -> anyhow::Result<i64> {
  if let Ok(unix_ts) = field.trim().parse::<i64>() {
    return unix_ts
      .checked_mul(1000)
      .ok_or_else(|| anyhow::anyhow!("Timestamp {} is out of range", unix_ts));
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S") {
    return Ok(dt.and_utc().timestamp_millis());
  }
  let date = NaiveDate::parse_from_str(field, "%Y-%m-%d")
    .map_err(|e| anyhow::anyhow!("Invalid date format {:?}: {}", field, e))?;
  let dt = date
    .and_hms_opt(0, 0, 0)
    .ok_or_else(|| anyhow::anyhow!("Invalid date {:?}", field))?;
  Ok(dt.and_utc().timestamp_millis())
}

fn column(headers: &[String], names: &[&str], fallback: usize) -> usize {
  names
    .iter()
    .find_map(|name| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)))
    .unwrap_or(fallback)
}

/// Reads `<dir>/<TICKER>.csv`.
///
/// Accepts Yahoo style exports (`Date,Open,High,Low,Close,Adj Close,Volume`) and files
/// without a header row laid out as `date,open,high,low,close`. A first row whose first
/// field parses as a date is data, anything else is a header.
/// Rows with an unparsable close are skipped. Duplicate dates keep the last row.
#[derive(Debug, Clone)]
pub struct CsvProvider {
  pub dir: PathBuf,
}

impl CsvProvider {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn path(&self, ticker: &str) -> PathBuf {
    self.dir.join(format!("{}.csv", ticker))
  }

  pub fn read_csv(csv_path: &Path, start: Option<i64>, end: Option<i64>) -> anyhow::Result<TimeSeries> {
    let file_buffer = File::open(csv_path)
      .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", csv_path.display(), e))?;
    let mut csv = csv::ReaderBuilder::new()
      .has_headers(false)
      .from_reader(file_buffer);
    let mut records = csv.records();

    let first = records.next().transpose()?;
    let (date_col, close_col, first_row) = match first {
      Some(row) if row.get(0).is_some_and(|field| parse_date(field).is_ok()) => (0, 4, Some(row)),
      Some(row) => {
        let headers: Vec<String> = row.iter().map(String::from).collect();
        (
          column(&headers, &["date", "timestamp"], 0),
          column(&headers, &["close", "adj close"], 4),
          None,
        )
      }
      None => (0, 4, None),
    };

    let mut closes = BTreeMap::new();
    for record in first_row.into_iter().map(Ok).chain(records) {
      let record: csv::StringRecord = record?;
      let (Some(date), Some(close)) = (record.get(date_col), record.get(close_col)) else {
        warn!("Skipping short row {:?} in {}", record, csv_path.display());
        continue;
      };
      let x = parse_date(date)?;
      match f64::from_str(close.trim()) {
        Ok(y) if y.is_finite() => {
          closes.insert(x, y);
        }
        _ => warn!("Skipping row dated {} with close {:?}", date, close),
      }
    }

    // only keep closes within the requested range
    closes.retain(|&x, _| match (start, end) {
      (Some(start), Some(end)) => x > start && x < end,
      (Some(start), None) => x > start,
      (None, Some(end)) => x < end,
      (None, None) => true,
    });
    debug!("Read {} closes from {}", closes.len(), csv_path.display());

    let data = closes.into_iter().map(|(x, y)| Data { x, y }).collect();
    Ok(TimeSeries::new(data)?)
  }
}

impl PriceProvider for CsvProvider {
  fn closes(&self, ticker: &str, start: Option<i64>, end: Option<i64>) -> anyhow::Result<TimeSeries> {
    Self::read_csv(&self.path(ticker), start, end)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_supported_date_formats() {
    assert_eq!(parse_date("86400").unwrap(), 86_400_000);
    assert_eq!(parse_date("1970-01-02").unwrap(), 86_400_000);
    assert_eq!(parse_date("1970-01-02 00:00:01").unwrap(), 86_401_000);
    assert!(parse_date("02/01/1970").is_err());
  }

  #[test]
  fn finds_columns_by_name() {
    let headers: Vec<String> = ["Date", "Open", "High", "Low", "Adj Close", "Close"]
      .iter()
      .map(|s| s.to_string())
      .collect();
    assert_eq!(column(&headers, &["date", "timestamp"], 0), 0);
    assert_eq!(column(&headers, &["close", "adj close"], 4), 5);
    assert_eq!(column(&headers, &["volume"], 6), 6);
  }

  #[test]
  fn lookback_is_in_the_past() {
    assert!(lookback_start(1).unwrap() < Utc::now().timestamp_millis());
    assert!(lookback_start(0).unwrap() <= Utc::now().timestamp_millis());
  }

  #[test]
  fn lookback_past_the_calendar_is_an_error() {
    assert!(lookback_start(300_000).is_err());
    assert!(lookback_start(u32::MAX).is_err());
  }

  #[test]
  fn oversized_unix_timestamp_is_an_error() {
    assert!(parse_date(&i64::MAX.to_string()).is_err());
  }
}
