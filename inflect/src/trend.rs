use crate::{fraction_positive, mean, DerivativeSeries, InflectResult, InvalidInput, MIN_DETECTOR_LEN};
use serde::{Deserialize, Serialize};

/// Share of time trending up above which the trend counts as bullish.
pub const BULLISH_FRACTION: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendStatistics {
  /// Fraction of samples with positive velocity, in [0, 1].
  pub fraction_up: f64,
  /// Fraction of samples with positive acceleration, in [0, 1].
  pub fraction_accelerating: f64,
  pub mean_velocity: f64,
  pub mean_acceleration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendBias {
  /// Favors long strategies.
  Bullish,
  /// Significant downtrend share, favors defensive strategies.
  Defensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Momentum {
  Favorable,
  Cautious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outlook {
  pub bias: TrendBias,
  pub momentum: Momentum,
}

impl TrendStatistics {
  pub fn pct_time_up(&self) -> f64 {
    self.fraction_up * 100.0
  }

  pub fn pct_time_down(&self) -> f64 {
    100.0 - self.pct_time_up()
  }

  pub fn pct_time_accelerating(&self) -> f64 {
    self.fraction_accelerating * 100.0
  }

  pub fn pct_time_decelerating(&self) -> f64 {
    100.0 - self.pct_time_accelerating()
  }

  pub fn outlook(&self) -> Outlook {
    let bias = if self.fraction_up > BULLISH_FRACTION {
      TrendBias::Bullish
    } else {
      TrendBias::Defensive
    };
    let momentum = if self.mean_velocity > 0.0 {
      Momentum::Favorable
    } else {
      Momentum::Cautious
    };
    Outlook { bias, momentum }
  }
}

fn defined_mean(op: &'static str, series: &DerivativeSeries) -> InflectResult<f64> {
  let values = series.values();
  if values.is_empty() {
    return Err(InvalidInput::Undefined { op });
  }
  Ok(mean(&values))
}

/// Aggregate trend of a velocity/acceleration pair.
/// Boundary samples take part like any other. Undefined samples count toward the
/// fractions' denominators but are left out of the means.
pub fn compute_trend_statistics(
  first: &DerivativeSeries,
  second: &DerivativeSeries,
) -> InflectResult<TrendStatistics> {
  const OP: &str = "trend statistics";
  for series in [first, second] {
    if series.len() < MIN_DETECTOR_LEN {
      return Err(InvalidInput::TooShort {
        op: OP,
        required: MIN_DETECTOR_LEN,
        actual: series.len(),
      });
    }
  }
  first.check_aligned(second, OP)?;

  Ok(TrendStatistics {
    fraction_up: fraction_positive(&first.y()),
    fraction_accelerating: fraction_positive(&second.y()),
    mean_velocity: defined_mean(OP, first)?,
    mean_acceleration: defined_mean(OP, second)?,
  })
}
