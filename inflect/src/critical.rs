use crate::{compute_trend_statistics, DerivativeSeries, Derivatives, InflectResult, InvalidInput, Sample, TrendStatistics};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fewest samples that still leave an interior point to classify.
pub const MIN_DETECTOR_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Classification {
  Maximum,
  Minimum,
  Inflection,
  BuySignal,
  SellSignal,
}

impl Classification {
  pub const ALL: [Classification; 5] = [
    Classification::Maximum,
    Classification::Minimum,
    Classification::Inflection,
    Classification::BuySignal,
    Classification::SellSignal,
  ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CriticalPoint {
  pub x: i64,
  pub classification: Classification,
}

/// How a first derivative scan treats samples that are exactly zero or undefined.
///
/// Positive always means `> 0` and negative `< 0`.
/// `Bridged` compares each signed sample with the most recent signed sample before it,
/// so a turn through a flat stretch is reported at the first sample past it.
/// `Strict` only compares neighbours, so a single zero hides the turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignRule {
  #[default]
  Bridged,
  Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
  Positive,
  Negative,
  Neutral,
}

impl Sign {
  fn of(y: Option<f64>) -> Self {
    match y {
      Some(v) if v > 0.0 => Sign::Positive,
      Some(v) if v < 0.0 => Sign::Negative,
      _ => Sign::Neutral,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
  /// - to +
  Up,
  /// + to -
  Down,
}

/// Turns at indices `1..end`, each reported at the index where the new sign appears.
fn turns(samples: &[Sample], rule: SignRule, end: usize) -> Vec<(i64, Turn)> {
  let start = Sign::of(samples[0].y);
  samples[1..end]
    .iter()
    .scan(start, |prev, s| {
      let current = Sign::of(s.y);
      let turn = match (*prev, current) {
        (Sign::Positive, Sign::Negative) => Some((s.x, Turn::Down)),
        (Sign::Negative, Sign::Positive) => Some((s.x, Turn::Up)),
        _ => None,
      };
      if rule == SignRule::Strict || current != Sign::Neutral {
        *prev = current;
      }
      Some(turn)
    })
    .flatten()
    .collect()
}

fn check_len(op: &'static str, series: &DerivativeSeries) -> InflectResult {
  if series.len() < MIN_DETECTOR_LEN {
    return Err(InvalidInput::TooShort {
      op,
      required: MIN_DETECTOR_LEN,
      actual: series.len(),
    });
  }
  Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extrema {
  pub maxima: BTreeSet<i64>,
  pub minima: BTreeSet<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
  pub buy: Vec<i64>,
  pub sell: Vec<i64>,
}

/// Every detected point of one analysis run, grouped by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPoints(BTreeMap<Classification, BTreeSet<i64>>);

impl CriticalPoints {
  pub fn new(extrema: Extrema, inflections: BTreeSet<i64>, signals: Signals) -> Self {
    let mut points = BTreeMap::new();
    points.insert(Classification::Maximum, extrema.maxima);
    points.insert(Classification::Minimum, extrema.minima);
    points.insert(Classification::Inflection, inflections);
    points.insert(Classification::BuySignal, signals.buy.into_iter().collect());
    points.insert(Classification::SellSignal, signals.sell.into_iter().collect());
    Self(points)
  }

  pub fn get(&self, classification: Classification) -> Option<&BTreeSet<i64>> {
    self.0.get(&classification)
  }

  pub fn count(&self, classification: Classification) -> usize {
    self.get(classification).map_or(0, |set| set.len())
  }

  /// All points in chronological order.
  pub fn points(&self) -> Vec<CriticalPoint> {
    let mut points: Vec<CriticalPoint> = self
      .0
      .iter()
      .flat_map(|(&classification, xs)| {
        xs.iter().map(move |&x| CriticalPoint { x, classification })
      })
      .collect();
    points.sort();
    points
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPointDetector {
  pub sign_rule: SignRule,
}

impl CriticalPointDetector {
  pub fn new(sign_rule: SignRule) -> Self {
    Self { sign_rule }
  }

  /// Local maxima (+ to -) and minima (- to +) of the first derivative over interior indices.
  pub fn find_extrema(&self, first: &DerivativeSeries) -> InflectResult<Extrema> {
    check_len("find extrema", first)?;
    let mut extrema = Extrema::default();
    for (x, turn) in turns(first.samples(), self.sign_rule, first.len() - 1) {
      match turn {
        Turn::Down => extrema.maxima.insert(x),
        Turn::Up => extrema.minima.insert(x),
      };
    }
    debug!(
      "Found {} maxima and {} minima",
      extrema.maxima.len(),
      extrema.minima.len()
    );
    Ok(extrema)
  }

  /// Interior points where the second derivative changes sign, `f''[i-1] * f''[i] < 0`.
  pub fn find_inflection_points(&self, second: &DerivativeSeries) -> InflectResult<BTreeSet<i64>> {
    check_len("find inflection points", second)?;
    let samples = second.samples();
    let inflections: BTreeSet<i64> = samples[..samples.len() - 1]
      .windows(2)
      .filter_map(|w| match (w[0].y, w[1].y) {
        (Some(a), Some(b)) if a * b < 0.0 => Some(w[1].x),
        _ => None,
      })
      .collect();
    debug!("Found {} inflection points", inflections.len());
    Ok(inflections)
  }

  /// Buy where the first derivative turns - to +, sell where it turns + to -.
  /// Unlike extrema the scan includes the final sample.
  pub fn find_signals(&self, first: &DerivativeSeries) -> InflectResult<Signals> {
    check_len("find signals", first)?;
    let mut signals = Signals::default();
    for (x, turn) in turns(first.samples(), self.sign_rule, first.len()) {
      match turn {
        Turn::Up => signals.buy.push(x),
        Turn::Down => signals.sell.push(x),
      }
    }
    debug!(
      "Found {} buy and {} sell signals",
      signals.buy.len(),
      signals.sell.len()
    );
    Ok(signals)
  }

  pub fn compute_trend_statistics(
    &self,
    first: &DerivativeSeries,
    second: &DerivativeSeries,
  ) -> InflectResult<TrendStatistics> {
    compute_trend_statistics(first, second)
  }

  /// Extrema, inflection points and signals of one derivative set.
  pub fn detect(&self, derivatives: &Derivatives) -> InflectResult<CriticalPoints> {
    derivatives
      .first
      .check_aligned(&derivatives.second, "detect critical points")?;
    let extrema = self.find_extrema(&derivatives.first)?;
    let inflections = self.find_inflection_points(&derivatives.second)?;
    let signals = self.find_signals(&derivatives.first)?;
    Ok(CriticalPoints::new(extrema, inflections, signals))
  }
}

pub fn find_extrema(first: &DerivativeSeries) -> InflectResult<Extrema> {
  CriticalPointDetector::default().find_extrema(first)
}

pub fn find_inflection_points(second: &DerivativeSeries) -> InflectResult<BTreeSet<i64>> {
  CriticalPointDetector::default().find_inflection_points(second)
}

pub fn find_signals(first: &DerivativeSeries) -> InflectResult<Signals> {
  CriticalPointDetector::default().find_signals(first)
}
