use crate::{Derivative, DerivativeSeries, InflectResult, InvalidInput, Sample, TimeSeries};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STEP_SIZE: f64 = 1.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 20;

fn check_step(step_size: f64) -> InflectResult {
  if step_size.is_finite() && step_size > 0.0 {
    Ok(())
  } else {
    Err(InvalidInput::NonPositiveStep(step_size))
  }
}

fn check_len(op: &'static str, required: usize, actual: usize) -> InflectResult {
  if actual < required {
    return Err(InvalidInput::TooShort {
      op,
      required,
      actual,
    });
  }
  Ok(())
}

// needs y.len() >= 2
fn central_difference(y: &[f64], h: f64) -> Vec<f64> {
  let n = y.len();
  (0..n)
    .map(|i| match i {
      0 => (y[1] - y[0]) / h,
      i if i == n - 1 => (y[n - 1] - y[n - 2]) / h,
      i => (y[i + 1] - y[i - 1]) / (2.0 * h),
    })
    .collect()
}

// needs y.len() >= 3
fn second_difference(y: &[f64], h: f64) -> Vec<f64> {
  let interior: Vec<f64> = y
    .windows(3)
    .map(|w| (w[2] - 2.0 * w[1] + w[0]) / (h * h))
    .collect();
  let first = interior[0];
  let last = interior[interior.len() - 1];
  std::iter::once(first)
    .chain(interior)
    .chain(std::iter::once(last))
    .collect()
}

fn trailing_mean(y: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
  let warmup = (window - 1).min(y.len());
  let averaged = y.windows(window).map(|w| {
    w.iter()
      .copied()
      .sum::<Option<f64>>()
      .map(|sum| sum / window as f64)
  });
  std::iter::repeat(None).take(warmup).chain(averaged).collect()
}

/// Velocity of the series.
/// Central difference `(y[i+1] - y[i-1]) / 2h` at interior points,
/// one-sided forward/backward differences at the two ends.
pub fn first_derivative(series: &TimeSeries, step_size: f64) -> InflectResult<DerivativeSeries> {
  check_step(step_size)?;
  check_len("first derivative", 2, series.len())?;
  let values = central_difference(&series.y(), step_size);
  debug!("First derivative over {} samples", values.len());
  Ok(DerivativeSeries::aligned(
    Derivative::First,
    series,
    values,
  ))
}

/// Acceleration of the series, `(y[i+1] - 2y[i] + y[i-1]) / h²` at interior points.
///
/// The two boundary values are copies of their nearest interior neighbour.
/// They are an extrapolation and carry no curvature information of their own.
pub fn second_derivative(series: &TimeSeries, step_size: f64) -> InflectResult<DerivativeSeries> {
  check_step(step_size)?;
  check_len("second derivative", 3, series.len())?;
  let values = second_difference(&series.y(), step_size);
  debug!("Second derivative over {} samples", values.len());
  Ok(DerivativeSeries::aligned(
    Derivative::Second,
    series,
    values,
  ))
}

/// Trailing simple moving average over `window_size` samples.
/// The first `window_size - 1` samples, and any window touching an undefined sample, are `None`.
pub fn smooth(series: &DerivativeSeries, window_size: usize) -> InflectResult<DerivativeSeries> {
  if window_size == 0 {
    return Err(InvalidInput::NonPositiveWindow(window_size));
  }
  if window_size > series.len() {
    warn!(
      "Smoothing window {} exceeds series length {}, no sample will be defined",
      window_size,
      series.len()
    );
  }
  let averaged = trailing_mean(&series.y(), window_size);
  let samples = series
    .samples()
    .iter()
    .zip(averaged)
    .map(|(s, y)| Sample { x: s.x, y })
    .collect();
  Ok(DerivativeSeries::new(
    Derivative::Smoothed {
      window: window_size,
    },
    samples,
  ))
}

/// The derivative set one analysis run works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivatives {
  pub first: DerivativeSeries,
  pub second: DerivativeSeries,
  pub smoothed: DerivativeSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivativeEstimator {
  pub step_size: f64,
  pub smoothing_window: usize,
}

impl Default for DerivativeEstimator {
  fn default() -> Self {
    Self {
      step_size: DEFAULT_STEP_SIZE,
      smoothing_window: DEFAULT_SMOOTHING_WINDOW,
    }
  }
}

impl DerivativeEstimator {
  pub fn new(step_size: f64, smoothing_window: usize) -> Self {
    Self {
      step_size,
      smoothing_window,
    }
  }

  pub fn first(&self, series: &TimeSeries) -> InflectResult<DerivativeSeries> {
    first_derivative(series, self.step_size)
  }

  pub fn second(&self, series: &TimeSeries) -> InflectResult<DerivativeSeries> {
    second_derivative(series, self.step_size)
  }

  pub fn smooth(&self, series: &DerivativeSeries) -> InflectResult<DerivativeSeries> {
    smooth(series, self.smoothing_window)
  }

  /// First, second and smoothed first derivative.
  /// Every parameter is checked before anything is computed.
  pub fn estimate(&self, series: &TimeSeries) -> InflectResult<Derivatives> {
    check_step(self.step_size)?;
    if self.smoothing_window == 0 {
      return Err(InvalidInput::NonPositiveWindow(self.smoothing_window));
    }
    check_len("second derivative", 3, series.len())?;

    let first = self.first(series)?;
    let second = self.second(series)?;
    let smoothed = self.smooth(&first)?;
    Ok(Derivatives {
      first,
      second,
      smoothed,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn constant_series_has_zero_derivatives() {
    let series = TimeSeries::indexed(&[5.0; 10]);
    let first = first_derivative(&series, 1.0).unwrap();
    let second = second_derivative(&series, 1.0).unwrap();
    assert!(first.values().iter().all(|&v| v == 0.0));
    assert!(second.values().iter().all(|&v| v == 0.0));
  }

  #[test]
  fn linear_series_has_constant_velocity() {
    let (a, b, h) = (2.5, -3.0, 0.5);
    let values: Vec<f64> = (0..12).map(|i| a * i as f64 + b).collect();
    let series = TimeSeries::indexed(&values);

    let first = first_derivative(&series, h).unwrap();
    assert_eq!(first.len(), values.len());
    assert!(first.values().iter().all(|&v| approx(v, a / h)));

    let second = second_derivative(&series, h).unwrap();
    assert_eq!(second.len(), values.len());
    assert!(second.values()[1..values.len() - 1]
      .iter()
      .all(|&v| approx(v, 0.0)));
  }

  #[test]
  fn first_derivative_uses_one_sided_boundaries() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0]);
    let first = first_derivative(&series, 1.0).unwrap();
    assert_eq!(first.values(), vec![1.0, 1.0, 0.0, -1.0, 0.0, 1.0, 1.0]);
    assert_eq!(first.x(), series.x());
  }

  #[test]
  fn first_derivative_of_two_points() {
    let series = TimeSeries::indexed(&[3.0, 7.0]);
    let first = first_derivative(&series, 2.0).unwrap();
    assert_eq!(first.values(), vec![2.0, 2.0]);
  }

  #[test]
  fn second_derivative_copies_boundaries() {
    let series = TimeSeries::indexed(&[0.0, 1.0, 4.0, 9.0, 15.0]);
    let second = second_derivative(&series, 1.0).unwrap();
    assert_eq!(second.values(), vec![2.0, 2.0, 2.0, 1.0, 1.0]);
  }

  #[test]
  fn short_series_are_rejected() {
    let one = TimeSeries::indexed(&[1.0]);
    assert_eq!(
      first_derivative(&one, 1.0),
      Err(InvalidInput::TooShort {
        op: "first derivative",
        required: 2,
        actual: 1
      })
    );
    let two = TimeSeries::indexed(&[1.0, 2.0]);
    assert_eq!(
      second_derivative(&two, 1.0),
      Err(InvalidInput::TooShort {
        op: "second derivative",
        required: 3,
        actual: 2
      })
    );
  }

  #[test]
  fn step_size_must_be_positive() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0]);
    assert_eq!(
      first_derivative(&series, 0.0),
      Err(InvalidInput::NonPositiveStep(0.0))
    );
    assert_eq!(
      second_derivative(&series, -1.0),
      Err(InvalidInput::NonPositiveStep(-1.0))
    );
    assert!(first_derivative(&series, f64::NAN).is_err());
  }

  #[test]
  fn unit_window_is_identity() {
    let series = TimeSeries::indexed(&[1.5, -2.0, 3.25, 8.0]);
    let source = DerivativeSeries::from(&series);
    let smoothed = smooth(&source, 1).unwrap();
    assert_eq!(smoothed.y(), source.y());
    assert_eq!(smoothed.x(), source.x());
  }

  #[test]
  fn smoothing_leaves_warmup_undefined() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let smoothed = smooth(&DerivativeSeries::from(&series), 3).unwrap();
    assert_eq!(
      smoothed.y(),
      vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
    );
    assert_eq!(smoothed.kind, Derivative::Smoothed { window: 3 });
  }

  #[test]
  fn smoothing_window_longer_than_series() {
    let series = TimeSeries::indexed(&[1.0, 2.0]);
    let smoothed = smooth(&DerivativeSeries::from(&series), 5).unwrap();
    assert_eq!(smoothed.y(), vec![None, None]);
  }

  #[test]
  fn smoothing_propagates_undefined_samples() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let once = smooth(&DerivativeSeries::from(&series), 2).unwrap();
    let twice = smooth(&once, 2).unwrap();
    assert_eq!(twice.y(), vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
  }

  #[test]
  fn zero_window_is_rejected() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0]);
    assert_eq!(
      smooth(&DerivativeSeries::from(&series), 0),
      Err(InvalidInput::NonPositiveWindow(0))
    );
  }

  #[test]
  fn estimator_validates_before_computing() {
    let series = TimeSeries::indexed(&[1.0, 2.0]);
    let estimator = DerivativeEstimator::default();
    assert!(matches!(
      estimator.estimate(&series),
      Err(InvalidInput::TooShort { required: 3, .. })
    ));

    let series = TimeSeries::indexed(&[1.0, 2.0, 4.0, 8.0]);
    let estimator = DerivativeEstimator::new(1.0, 2);
    let derivatives = estimator.estimate(&series).unwrap();
    assert_eq!(derivatives.first.len(), 4);
    assert_eq!(derivatives.second.len(), 4);
    assert_eq!(derivatives.smoothed.len(), 4);
    assert_eq!(derivatives.smoothed.get(0), None);
  }
}
