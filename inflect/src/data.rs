use crate::{InflectResult, InvalidInput};
use serde::{Deserialize, Serialize};

pub trait Y: Clone {
  fn y(&self) -> f64;
}

pub trait X: Clone {
  fn x(&self) -> i64;
}

impl Y for f64 {
  fn y(&self) -> f64 {
    *self
  }
}

impl X for i64 {
  fn x(&self) -> i64 {
    *self
  }
}

/// A single observation. `x` is a UNIX timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Data {
  pub x: i64,
  pub y: f64,
}

impl Y for Data {
  fn y(&self) -> f64 {
    self.y.y()
  }
}

impl X for Data {
  fn x(&self) -> i64 {
    self.x.x()
  }
}

/// Source price series. Timestamps are strictly increasing, which is checked on construction
/// and on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Data>", into = "Vec<Data>")]
pub struct TimeSeries(Vec<Data>);

impl TryFrom<Vec<Data>> for TimeSeries {
  type Error = InvalidInput;

  fn try_from(data: Vec<Data>) -> InflectResult<Self> {
    Self::new(data)
  }
}

impl From<TimeSeries> for Vec<Data> {
  fn from(series: TimeSeries) -> Self {
    series.0
  }
}

impl TimeSeries {
  pub fn new(data: Vec<Data>) -> InflectResult<Self> {
    for (index, pair) in data.windows(2).enumerate() {
      if pair[1].x <= pair[0].x {
        return Err(InvalidInput::NotIncreasing {
          index: index + 1,
          prev: pair[0].x,
          x: pair[1].x,
        });
      }
    }
    Ok(Self(data))
  }

  /// Series whose timestamps are the sample indices.
  pub fn indexed(values: &[f64]) -> Self {
    Self(
      values
        .iter()
        .enumerate()
        .map(|(i, &y)| Data { x: i as i64, y })
        .collect(),
    )
  }

  pub fn x(&self) -> Vec<i64> {
    self.0.iter().map(|d| d.x()).collect()
  }

  pub fn y(&self) -> Vec<f64> {
    self.0.iter().map(|d| d.y()).collect()
  }

  pub fn data(&self) -> &[Data] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Close at the given timestamp, if the series has one.
  pub fn value_at(&self, x: i64) -> Option<f64> {
    self
      .0
      .binary_search_by_key(&x, |d| d.x)
      .ok()
      .map(|i| self.0[i].y)
  }
}

/// Which quantity a [`DerivativeSeries`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Derivative {
  /// The source values themselves.
  Zeroth,
  /// Velocity.
  First,
  /// Acceleration.
  Second,
  /// Trailing moving average over `window` samples.
  Smoothed { window: usize },
}

/// One derivative sample. `y` is `None` where no value could be computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
  pub x: i64,
  pub y: Option<f64>,
}

impl X for Sample {
  fn x(&self) -> i64 {
    self.x
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeSeries {
  pub kind: Derivative,
  samples: Vec<Sample>,
}

impl DerivativeSeries {
  pub(crate) fn new(kind: Derivative, samples: Vec<Sample>) -> Self {
    Self { kind, samples }
  }

  /// Pairs `values` with the timestamps of `source`. Lengths must already match.
  pub(crate) fn aligned(kind: Derivative, source: &TimeSeries, values: Vec<f64>) -> Self {
    let samples = source
      .data()
      .iter()
      .zip(values)
      .map(|(d, y)| Sample { x: d.x, y: Some(y) })
      .collect();
    Self { kind, samples }
  }

  pub fn samples(&self) -> &[Sample] {
    &self.samples
  }

  pub fn x(&self) -> Vec<i64> {
    self.samples.iter().map(|s| s.x).collect()
  }

  pub fn y(&self) -> Vec<Option<f64>> {
    self.samples.iter().map(|s| s.y).collect()
  }

  /// Defined values only, in order.
  pub fn values(&self) -> Vec<f64> {
    self.samples.iter().filter_map(|s| s.y).collect()
  }

  /// Defined samples as plain points, for plotting.
  pub fn to_data(&self) -> Vec<Data> {
    self
      .samples
      .iter()
      .filter_map(|s| s.y.map(|y| Data { x: s.x, y }))
      .collect()
  }

  pub fn get(&self, index: usize) -> Option<f64> {
    self.samples.get(index).and_then(|s| s.y)
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  /// Fails unless `other` has the same length and the same timestamp at every index.
  pub fn check_aligned(&self, other: &DerivativeSeries, op: &'static str) -> InflectResult {
    if self.len() != other.len() {
      return Err(InvalidInput::LengthMismatch {
        op,
        left: self.len(),
        right: other.len(),
      });
    }
    match self
      .samples
      .iter()
      .zip(other.samples.iter())
      .position(|(a, b)| a.x != b.x)
    {
      Some(index) => Err(InvalidInput::Misaligned { op, index }),
      None => Ok(()),
    }
  }
}

impl From<&TimeSeries> for DerivativeSeries {
  fn from(series: &TimeSeries) -> Self {
    Self::aligned(Derivative::Zeroth, series, series.y())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializing_checks_timestamp_order() {
    let yaml = "
- { x: 5, y: 1.0 }
- { x: 1, y: 2.0 }
- { x: 1, y: 3.0 }
";
    let err = serde_yaml::from_str::<TimeSeries>(yaml).unwrap_err();
    assert!(err.to_string().contains("strictly increasing, index 1 has 1 after 5"));

    let yaml = "
- { x: 1, y: 1.0 }
- { x: 2, y: 2.0 }
";
    let series: TimeSeries = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(series.x(), vec![1, 2]);
    let back: TimeSeries = serde_yaml::from_str(&serde_yaml::to_string(&series).unwrap()).unwrap();
    assert_eq!(back, series);
  }

  #[test]
  fn rejects_out_of_order_timestamps() {
    let data = vec![
      Data { x: 1, y: 1.0 },
      Data { x: 3, y: 2.0 },
      Data { x: 3, y: 3.0 },
    ];
    assert_eq!(
      TimeSeries::new(data),
      Err(InvalidInput::NotIncreasing {
        index: 2,
        prev: 3,
        x: 3
      })
    );
  }

  #[test]
  fn value_at_finds_exact_timestamp() {
    let series = TimeSeries::indexed(&[10.0, 11.0, 12.0]);
    assert_eq!(series.value_at(1), Some(11.0));
    assert_eq!(series.value_at(7), None);
  }

  #[test]
  fn alignment_reports_first_differing_index() {
    let a = DerivativeSeries::from(&TimeSeries::indexed(&[1.0, 2.0, 3.0]));
    let shifted = TimeSeries::new(vec![
      Data { x: 0, y: 1.0 },
      Data { x: 1, y: 2.0 },
      Data { x: 5, y: 3.0 },
    ])
    .unwrap();
    let b = DerivativeSeries::from(&shifted);
    assert_eq!(
      a.check_aligned(&b, "test"),
      Err(InvalidInput::Misaligned {
        op: "test",
        index: 2
      })
    );

    let short = DerivativeSeries::from(&TimeSeries::indexed(&[1.0, 2.0]));
    assert_eq!(
      a.check_aligned(&short, "test"),
      Err(InvalidInput::LengthMismatch {
        op: "test",
        left: 3,
        right: 2
      })
    );
  }
}
