use inflect::*;
use log::info;
use std::path::{Path, PathBuf};

const VELOCITY_BINS: usize = 50;

/// Prices at the timestamps of one classification, for chart markers.
fn marker_points(series: &TimeSeries, analysis: &Analysis, classification: Classification) -> Vec<Data> {
  analysis
    .critical_points
    .get(classification)
    .map(|xs| {
      xs.iter()
        .filter_map(|&x| series.value_at(x).map(|y| Data { x, y }))
        .collect()
    })
    .unwrap_or_default()
}

/// Percent of time spent in each direction of velocity and acceleration.
fn trend_columns(trend: &TrendStatistics) -> Vec<Column> {
  vec![
    Column {
      label: "Up".to_string(),
      value: trend.pct_time_up(),
      color: RISING,
    },
    Column {
      label: "Down".to_string(),
      value: trend.pct_time_down(),
      color: FALLING,
    },
    Column {
      label: "Accelerating".to_string(),
      value: trend.pct_time_accelerating(),
      color: ACCELERATING,
    },
    Column {
      label: "Decelerating".to_string(),
      value: trend.pct_time_decelerating(),
      color: DECELERATING,
    },
  ]
}

/// Positive and negative first derivative values. Zeros belong to neither.
fn velocity_groups(analysis: &Analysis) -> Vec<Group> {
  let values = analysis.derivatives.first.values();
  vec![
    Group {
      values: values.iter().copied().filter(|v| *v > 0.0).collect(),
      label: "Positive velocity".to_string(),
      color: RISING,
    },
    Group {
      values: values.iter().copied().filter(|v| *v < 0.0).collect(),
      label: "Negative velocity".to_string(),
      color: FALLING,
    },
  ]
}

fn headline(analysis: &Analysis) -> String {
  let cfg = &analysis.config;
  let rule = match cfg.sign_rule {
    SignRule::Bridged => "bridged",
    SignRule::Strict => "strict",
  };
  format!(
    "{} (sign rule: {}, step: {}, smoothing window: {})",
    analysis.ticker, rule, cfg.step_size, cfg.smoothing_window
  )
}

pub fn summary(analysis: &Analysis) {
  let trend = &analysis.trend;
  let points = &analysis.critical_points;
  info!("==================== {} ====================", headline(analysis));
  info!("Mean velocity: {}", trunc!(trend.mean_velocity, 4));
  info!("Mean acceleration: {}", trunc!(trend.mean_acceleration, 4));
  info!("Time trending up: {}%", trunc!(trend.pct_time_up(), 1));
  info!("Time trending down: {}%", trunc!(trend.pct_time_down(), 1));
  info!("Time accelerating: {}%", trunc!(trend.pct_time_accelerating(), 1));
  info!("Time decelerating: {}%", trunc!(trend.pct_time_decelerating(), 1));
  info!("Local maxima: {}", points.count(Classification::Maximum));
  info!("Local minima: {}", points.count(Classification::Minimum));
  info!("Inflection points: {}", points.count(Classification::Inflection));
  info!(
    "Buy signals: {}, sell signals: {}",
    points.count(Classification::BuySignal),
    points.count(Classification::SellSignal)
  );

  let outlook = trend.outlook();
  match outlook.bias {
    TrendBias::Bullish => info!("Dominant uptrend, favors long strategies"),
    TrendBias::Defensive => info!("Significant downtrend share, consider defensive strategies"),
  }
  match outlook.momentum {
    Momentum::Favorable => info!("Positive mean velocity, momentum favorable"),
    Momentum::Cautious => info!("Non-positive mean velocity, caution with new positions"),
  }
}

/// Writes the price, signal, derivative and trend charts for one analysis into `out_dir`.
pub fn charts(series: &TimeSeries, analysis: &Analysis, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
  std::fs::create_dir_all(out_dir)?;
  let ticker = analysis.ticker.as_str();
  let file = |name: &str| out_dir.join(format!("{}_{}.png", ticker, name));
  let price = || Series {
    data: series.data().to_vec(),
    label: "Close".to_string(),
  };
  let derivatives = &analysis.derivatives;

  let critical = file("critical_points");
  Plot::plot(ChartConfig {
    out_file: &critical.to_string_lossy(),
    title: &format!("{} critical points", ticker),
    x_label: "Date",
    y_label: "Price",
    series: vec![price()],
    markers: vec![
      Markers {
        data: marker_points(series, analysis, Classification::Maximum),
        label: "Maxima".to_string(),
        marker: Marker::Down,
      },
      Markers {
        data: marker_points(series, analysis, Classification::Minimum),
        label: "Minima".to_string(),
        marker: Marker::Up,
      },
      Markers {
        data: marker_points(series, analysis, Classification::Inflection),
        label: "Inflection points".to_string(),
        marker: Marker::Dot,
      },
    ],
    zero_line: false,
  })?;

  let signals = file("signals");
  Plot::plot(ChartConfig {
    out_file: &signals.to_string_lossy(),
    title: &format!("{} derivative signals", ticker),
    x_label: "Date",
    y_label: "Price",
    series: vec![price()],
    markers: vec![
      Markers {
        data: marker_points(series, analysis, Classification::BuySignal),
        label: "Buy".to_string(),
        marker: Marker::Up,
      },
      Markers {
        data: marker_points(series, analysis, Classification::SellSignal),
        label: "Sell".to_string(),
        marker: Marker::Down,
      },
    ],
    zero_line: false,
  })?;

  let rates = file("derivatives");
  Plot::plot(ChartConfig {
    out_file: &rates.to_string_lossy(),
    title: &format!("{} velocity and acceleration", ticker),
    x_label: "Date",
    y_label: "Rate of change",
    series: vec![
      Series {
        data: derivatives.first.to_data(),
        label: "First derivative".to_string(),
      },
      Series {
        data: derivatives.second.to_data(),
        label: "Second derivative".to_string(),
      },
    ],
    markers: vec![],
    zero_line: true,
  })?;

  let dual = file("price_velocity");
  Plot::plot_dual_axis(DualAxisConfig {
    out_file: &dual.to_string_lossy(),
    title: &format!("{} price and velocity", ticker),
    x_label: "Date",
    series: price(),
    y_label: "Price",
    second_axis_series: Series {
      data: derivatives.first.to_data(),
      label: "First derivative".to_string(),
    },
    second_axis_y_label: "Velocity",
    second_axis_zero_line: true,
  })?;

  let mut written = vec![critical, signals, rates, dual];

  // a series without any nonzero velocity has no distribution to draw
  let groups = velocity_groups(analysis);
  if groups.iter().any(|g| !g.values.is_empty()) {
    let histogram = file("velocity_distribution");
    Plot::histogram(HistogramConfig {
      out_file: &histogram.to_string_lossy(),
      title: &format!("{} velocity distribution", ticker),
      x_label: "Velocity",
      y_label: "Frequency",
      groups,
      bins: VELOCITY_BINS,
    })?;
    written.push(histogram);
  }

  let bars = file("trend");
  Plot::columns(ColumnConfig {
    out_file: &bars.to_string_lossy(),
    title: &format!("{} trend statistics", ticker),
    y_label: "Percent of time",
    columns: trend_columns(&analysis.trend),
  })?;
  written.push(bars);

  // an all-undefined smoothed series has nothing to draw
  if !derivatives.smoothed.values().is_empty() {
    let smoothed = file("smoothed_velocity");
    Plot::plot(ChartConfig {
      out_file: &smoothed.to_string_lossy(),
      title: &format!("{} smoothed velocity", ticker),
      x_label: "Date",
      y_label: "Velocity",
      series: vec![
        Series {
          data: derivatives.first.to_data(),
          label: "First derivative".to_string(),
        },
        Series {
          data: derivatives.smoothed.to_data(),
          label: "Moving average".to_string(),
        },
      ],
      markers: vec![],
      zero_line: true,
    })?;
    written.push(smoothed);
  }

  for path in written.iter() {
    info!("Wrote {}", path.display());
  }
  Ok(written)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn markers_sit_on_prices() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0]);
    let cfg = AnalysisConfig {
      smoothing_window: 3,
      ..AnalysisConfig::default()
    };
    let analysis = Analysis::run("TEST", &series, &cfg).unwrap();
    assert_eq!(
      marker_points(&series, &analysis, Classification::Maximum),
      vec![Data { x: 3, y: 2.0 }]
    );
    assert_eq!(
      marker_points(&series, &analysis, Classification::BuySignal),
      vec![Data { x: 5, y: 2.0 }]
    );
    assert!(marker_points(&series, &analysis, Classification::Inflection).is_empty());
  }

  #[test]
  fn trend_bars_cover_all_four_directions() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 4.0, 3.0, 1.0]);
    let analysis = Analysis::run("TEST", &series, &AnalysisConfig::default()).unwrap();
    let columns = trend_columns(&analysis.trend);
    let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Up", "Down", "Accelerating", "Decelerating"]);
    assert_eq!(columns[1].value, analysis.trend.pct_time_down());
    assert_eq!(columns[3].value, analysis.trend.pct_time_decelerating());
    assert!((columns[0].value + columns[1].value - 100.0).abs() < 1e-9);
  }

  #[test]
  fn velocity_groups_split_on_sign() {
    // first derivative [1, 1, 0, -1, 0, 1, 1]
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0]);
    let analysis = Analysis::run("TEST", &series, &AnalysisConfig::default()).unwrap();
    let groups = velocity_groups(&analysis);
    assert_eq!(groups[0].values, vec![1.0; 4]);
    assert_eq!(groups[1].values, vec![-1.0]);
  }

  #[test]
  fn headline_names_the_sign_rule() {
    let series = TimeSeries::indexed(&[1.0, 2.0, 3.0, 2.0, 1.0]);
    let strict = AnalysisConfig {
      sign_rule: SignRule::Strict,
      ..AnalysisConfig::default()
    };
    let analysis = Analysis::run("TEST", &series, &strict).unwrap();
    let line = headline(&analysis);
    assert!(line.starts_with("TEST"));
    assert!(line.contains("sign rule: strict"));
    let analysis = Analysis::run("TEST", &series, &AnalysisConfig::default()).unwrap();
    assert!(headline(&analysis).contains("sign rule: bridged"));
  }
}
