use crate::{
  compute_trend_statistics, Classification, CriticalPointDetector, CriticalPoints, DerivativeEstimator, Derivatives,
  InflectResult, SignRule, TimeSeries, TrendStatistics, DEFAULT_SMOOTHING_WINDOW, DEFAULT_STEP_SIZE,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
  pub step_size: f64,
  pub smoothing_window: usize,
  pub sign_rule: SignRule,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      step_size: DEFAULT_STEP_SIZE,
      smoothing_window: DEFAULT_SMOOTHING_WINDOW,
      sign_rule: SignRule::default(),
    }
  }
}

impl AnalysisConfig {
  pub fn estimator(&self) -> DerivativeEstimator {
    DerivativeEstimator::new(self.step_size, self.smoothing_window)
  }

  pub fn detector(&self) -> CriticalPointDetector {
    CriticalPointDetector::new(self.sign_rule)
  }
}

/// Result of one analysis run. Holds no reference to the source series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
  pub ticker: String,
  /// Parameters the run was made with.
  pub config: AnalysisConfig,
  pub derivatives: Derivatives,
  pub critical_points: CriticalPoints,
  pub trend: TrendStatistics,
}

impl Analysis {
  /// Prices -> derivatives -> critical points and trend statistics.
  pub fn run(ticker: &str, series: &TimeSeries, cfg: &AnalysisConfig) -> InflectResult<Self> {
    let derivatives = cfg.estimator().estimate(series)?;
    let critical_points = cfg.detector().detect(&derivatives)?;
    let trend = compute_trend_statistics(&derivatives.first, &derivatives.second)?;
    debug!(
      "{}: {} samples, {} maxima, {} minima, {} inflections",
      ticker,
      series.len(),
      critical_points.count(Classification::Maximum),
      critical_points.count(Classification::Minimum),
      critical_points.count(Classification::Inflection)
    );
    Ok(Self {
      ticker: ticker.to_string(),
      config: *cfg,
      derivatives,
      critical_points,
      trend,
    })
  }
}
