use crate::Data;
use chrono::DateTime;
use plotters::prelude::*;
use plotters::style::full_palette::*;
use plotters::style::{BLACK, WHITE};

const FIRST: RGBColor = BLUE_A700;
const SECOND: RGBColor = RED_A400;
const THIRD: RGBColor = GREEN_500;
const FOURTH: RGBColor = PURPLE_A400;
const OTHER: RGBColor = GREY_400;

pub const RISING: RGBColor = GREEN_500;
pub const FALLING: RGBColor = RED_A400;
pub const ACCELERATING: RGBColor = BLUE_A700;
pub const DECELERATING: RGBColor = ORANGE_700;

pub struct Series {
  pub data: Vec<Data>,
  pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
  /// Upward triangle, minima and buys.
  Up,
  /// Downward triangle, maxima and sells.
  Down,
  /// Square, inflection points.
  Dot,
}

impl Marker {
  fn color(&self) -> RGBColor {
    match self {
      Marker::Up => GREEN_500,
      Marker::Down => RED_A400,
      Marker::Dot => AMBER_800,
    }
  }
}

pub struct Markers {
  pub data: Vec<Data>,
  pub label: String,
  pub marker: Marker,
}

pub struct ChartConfig<'a> {
  pub out_file: &'a str,
  pub title: &'a str,
  pub x_label: &'a str,
  pub y_label: &'a str,
  pub series: Vec<Series>,
  pub markers: Vec<Markers>,
  /// Draw a horizontal line at y = 0.
  pub zero_line: bool,
}

struct Bounds {
  min_x: i64,
  max_x: i64,
  min_y: f64,
  max_y: f64,
}

impl Bounds {
  fn of<'a>(data: impl Iterator<Item = &'a Data>, zero_line: bool) -> Option<Self> {
    let mut bounds: Option<Self> = None;
    for datum in data {
      let b = bounds.get_or_insert(Self {
        min_x: datum.x,
        max_x: datum.x,
        min_y: datum.y,
        max_y: datum.y,
      });
      b.min_x = b.min_x.min(datum.x);
      b.max_x = b.max_x.max(datum.x);
      b.min_y = b.min_y.min(datum.y);
      b.max_y = b.max_y.max(datum.y);
    }
    bounds.map(|mut b| {
      if zero_line {
        b.min_y = b.min_y.min(0.0);
        b.max_y = b.max_y.max(0.0);
      }
      // flat data still needs a drawable range
      if b.max_x == b.min_x {
        b.max_x += 1;
      }
      if b.max_y - b.min_y < f64::EPSILON {
        b.min_y -= 1.0;
        b.max_y += 1.0;
      }
      b
    })
  }
}

fn date_label(x: i64) -> String {
  match DateTime::from_timestamp(x.div_euclid(1000), 0) {
    Some(dt) => dt.format("%Y-%m-%d").to_string(),
    None => x.to_string(),
  }
}

/// Two series over one time axis, the second scaled on the right hand axis.
pub struct DualAxisConfig<'a> {
  pub out_file: &'a str,
  pub title: &'a str,
  pub x_label: &'a str,
  pub series: Series,
  pub y_label: &'a str,
  pub second_axis_series: Series,
  pub second_axis_y_label: &'a str,
  /// Draw a horizontal line at y = 0 on the right hand axis.
  pub second_axis_zero_line: bool,
}

pub struct Group {
  pub values: Vec<f64>,
  pub label: String,
  pub color: RGBColor,
}

/// Overlaid histograms sharing one set of bins.
pub struct HistogramConfig<'a> {
  pub out_file: &'a str,
  pub title: &'a str,
  pub x_label: &'a str,
  pub y_label: &'a str,
  pub groups: Vec<Group>,
  pub bins: usize,
}

pub struct Column {
  pub label: String,
  pub value: f64,
  pub color: RGBColor,
}

/// One bar per column, each labelled with its name and value in percent.
pub struct ColumnConfig<'a> {
  pub out_file: &'a str,
  pub title: &'a str,
  pub y_label: &'a str,
  pub columns: Vec<Column>,
}

/// Counts per bin of width `width` starting at `min`. Values past the last bin land in it.
fn bin_counts(values: &[f64], min: f64, width: f64, bins: usize) -> Vec<usize> {
  let mut counts = vec![0; bins];
  for v in values {
    let bin = ((v - min) / width).floor().max(0.0) as usize;
    counts[bin.min(bins - 1)] += 1;
  }
  counts
}

pub struct Plot;

impl Plot {
  pub fn plot(cfg: ChartConfig<'_>) -> anyhow::Result<()> {
    let ChartConfig {
      out_file,
      title,
      x_label,
      y_label,
      series,
      markers,
      zero_line,
    } = cfg;

    let points = series
      .iter()
      .flat_map(|s| &s.data)
      .chain(markers.iter().flat_map(|m| &m.data));
    let Bounds {
      min_x,
      max_x,
      min_y,
      max_y,
    } = Bounds::of(points, zero_line).ok_or_else(|| anyhow::anyhow!("Nothing to plot for {}", title))?;

    let root = BitMapBackend::new(out_file, (2048, 1024)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
      .set_all_label_area_size(150)
      .margin(20)
      .caption(title, ("sans-serif", 40.0).into_font())
      .build_cartesian_2d(min_x..max_x, min_y..max_y)?;

    chart
      .configure_mesh()
      .light_line_style(WHITE)
      .label_style(("sans-serif", 30, &BLACK).into_text_style(&root))
      .x_desc(x_label)
      .y_desc(y_label)
      .x_labels(8)
      .y_labels(10)
      .x_label_formatter(&|x| date_label(*x))
      .y_label_formatter(&|y| format!("{:.2}", y))
      .draw()?;

    if zero_line {
      chart
        .draw_series(LineSeries::new(
          vec![(min_x, 0.0), (max_x, 0.0)],
          BLACK.mix(0.5).stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("Failed to draw zero line: {}", e))?;
    }

    for (i, s) in series.iter().enumerate() {
      let color = match i {
        0 => FIRST,
        1 => SECOND,
        2 => THIRD,
        3 => FOURTH,
        _ => OTHER,
      };
      chart
        .draw_series(LineSeries::new(
          s.data.iter().map(|data| (data.x, data.y)),
          color.stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("Failed to draw series: {}", e))?
        .label(s.label.as_str())
        .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], color.stroke_width(10)));
    }

    for m in markers.iter() {
      let color = m.marker.color();
      let style = color.filled();
      let shape = m.marker;
      chart
        .draw_series(m.data.iter().map(move |data| {
          let at = EmptyElement::at((data.x, data.y));
          match shape {
            Marker::Up => at + Polygon::new(vec![(0, -8), (-7, 6), (7, 6)], style),
            Marker::Down => at + Polygon::new(vec![(0, 8), (-7, -6), (7, -6)], style),
            Marker::Dot => at + Polygon::new(vec![(-5, -5), (5, -5), (5, 5), (-5, 5)], style),
          }
        }))
        .map_err(|e| anyhow::anyhow!("Failed to draw markers: {}", e))?
        .label(m.label.as_str())
        .legend(move |(x, y)| Circle::new((x + 10, y), 6, color.filled()));
    }

    chart
      .configure_series_labels()
      .position(SeriesLabelPosition::UpperLeft)
      .margin(20)
      .legend_area_size(30)
      .border_style(BLACK)
      .background_style(BLACK.mix(0.1))
      .label_font(("sans-serif", 24))
      .draw()
      .map_err(|e| anyhow::anyhow!("Failed to configure series labels: {}", e))?;

    root
      .present()
      .map_err(|e| anyhow::anyhow!("Failed to present root: {}", e))?;

    Ok(())
  }

  pub fn plot_dual_axis(cfg: DualAxisConfig<'_>) -> anyhow::Result<()> {
    let DualAxisConfig {
      out_file,
      title,
      x_label,
      series,
      y_label,
      second_axis_series,
      second_axis_y_label,
      second_axis_zero_line,
    } = cfg;

    let left = Bounds::of(series.data.iter(), false)
      .ok_or_else(|| anyhow::anyhow!("Nothing to plot for {}", title))?;
    let right = Bounds::of(second_axis_series.data.iter(), second_axis_zero_line)
      .ok_or_else(|| anyhow::anyhow!("Nothing to plot on second axis for {}", title))?;
    let min_x = left.min_x.min(right.min_x);
    let max_x = left.max_x.max(right.max_x);

    let root = BitMapBackend::new(out_file, (2048, 1024)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
      .set_all_label_area_size(150)
      .margin(20)
      .caption(title, ("sans-serif", 40.0).into_font())
      .build_cartesian_2d(min_x..max_x, left.min_y..left.max_y)?
      .set_secondary_coord(min_x..max_x, right.min_y..right.max_y);

    chart
      .configure_mesh()
      .light_line_style(WHITE)
      .label_style(("sans-serif", 30, &BLACK).into_text_style(&root))
      .x_desc(x_label)
      .y_desc(y_label)
      .x_labels(8)
      .y_labels(10)
      .x_label_formatter(&|x| date_label(*x))
      .y_label_formatter(&|y| format!("{:.2}", y))
      .draw()?;

    chart
      .configure_secondary_axes()
      .label_style(("sans-serif", 30, &SECOND).into_text_style(&root))
      .y_desc(second_axis_y_label)
      .y_labels(10)
      .y_label_formatter(&|y| format!("{:.2}", y))
      .draw()?;

    if second_axis_zero_line {
      chart
        .draw_secondary_series(LineSeries::new(
          vec![(min_x, 0.0), (max_x, 0.0)],
          BLACK.mix(0.5).stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("Failed to draw zero line: {}", e))?;
    }

    chart
      .draw_series(LineSeries::new(
        series.data.iter().map(|data| (data.x, data.y)),
        FIRST.stroke_width(2),
      ))
      .map_err(|e| anyhow::anyhow!("Failed to draw series: {}", e))?
      .label(series.label.as_str())
      .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], FIRST.stroke_width(10)));

    chart
      .draw_secondary_series(LineSeries::new(
        second_axis_series.data.iter().map(|data| (data.x, data.y)),
        SECOND.mix(0.7).stroke_width(1),
      ))
      .map_err(|e| anyhow::anyhow!("Failed to draw second axis series: {}", e))?
      .label(second_axis_series.label.as_str())
      .legend(move |(x, y)| PathElement::new([(x, y), (x + 20, y)], SECOND.stroke_width(10)));

    chart
      .configure_series_labels()
      .position(SeriesLabelPosition::UpperLeft)
      .margin(20)
      .legend_area_size(30)
      .border_style(BLACK)
      .background_style(WHITE.mix(0.8))
      .label_font(("sans-serif", 24))
      .draw()
      .map_err(|e| anyhow::anyhow!("Failed to configure series labels: {}", e))?;

    root
      .present()
      .map_err(|e| anyhow::anyhow!("Failed to present root: {}", e))?;

    Ok(())
  }

  pub fn histogram(cfg: HistogramConfig<'_>) -> anyhow::Result<()> {
    let HistogramConfig {
      out_file,
      title,
      x_label,
      y_label,
      groups,
      bins,
    } = cfg;
    if bins == 0 {
      return Err(anyhow::anyhow!("Histogram needs at least one bin"));
    }

    let mut values = groups.iter().flat_map(|g| g.values.iter().copied());
    let first = values
      .next()
      .ok_or_else(|| anyhow::anyhow!("Nothing to plot for {}", title))?;
    let (mut min, mut max) = values.fold((first, first), |acc, v| (acc.0.min(v), acc.1.max(v)));
    if max - min < f64::EPSILON {
      min -= 1.0;
      max += 1.0;
    }
    let width = (max - min) / bins as f64;

    let counts: Vec<Vec<usize>> = groups
      .iter()
      .map(|g| bin_counts(&g.values, min, width, bins))
      .collect();
    let max_count = counts.iter().flatten().copied().max().unwrap_or(0).max(1) as f64 * 1.1;

    let root = BitMapBackend::new(out_file, (2048, 1024)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
      .set_all_label_area_size(150)
      .margin(20)
      .caption(title, ("sans-serif", 40.0).into_font())
      .build_cartesian_2d(min..max, 0.0..max_count)?;

    chart
      .configure_mesh()
      .light_line_style(WHITE)
      .label_style(("sans-serif", 30, &BLACK).into_text_style(&root))
      .x_desc(x_label)
      .y_desc(y_label)
      .x_label_formatter(&|x| format!("{:.2}", x))
      .y_label_formatter(&|y| format!("{:.0}", y))
      .draw()?;

    for (g, counts) in groups.iter().zip(counts.iter()) {
      let color = g.color;
      chart
        .draw_series(counts.iter().enumerate().filter(|&(_, &c)| c > 0).map(|(i, &c)| {
          let x0 = min + i as f64 * width;
          Rectangle::new([(x0, 0.0), (x0 + width, c as f64)], color.mix(0.7).filled())
        }))
        .map_err(|e| anyhow::anyhow!("Failed to draw histogram: {}", e))?
        .label(g.label.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 20, y + 6)], color.filled()));
    }

    if min < 0.0 && max > 0.0 {
      chart
        .draw_series(LineSeries::new(
          vec![(0.0, 0.0), (0.0, max_count)],
          BLACK.stroke_width(3),
        ))
        .map_err(|e| anyhow::anyhow!("Failed to draw zero line: {}", e))?;
    }

    chart
      .configure_series_labels()
      .position(SeriesLabelPosition::UpperLeft)
      .margin(20)
      .legend_area_size(30)
      .border_style(BLACK)
      .background_style(BLACK.mix(0.1))
      .label_font(("sans-serif", 24))
      .draw()
      .map_err(|e| anyhow::anyhow!("Failed to configure series labels: {}", e))?;

    root
      .present()
      .map_err(|e| anyhow::anyhow!("Failed to present root: {}", e))?;

    Ok(())
  }

  pub fn columns(cfg: ColumnConfig<'_>) -> anyhow::Result<()> {
    let ColumnConfig {
      out_file,
      title,
      y_label,
      columns,
    } = cfg;
    if columns.is_empty() {
      return Err(anyhow::anyhow!("Nothing to plot for {}", title));
    }
    let max_y = columns.iter().fold(100.0_f64, |acc, c| acc.max(c.value)) * 1.15;

    let root = BitMapBackend::new(out_file, (2048, 1024)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
      .set_all_label_area_size(150)
      .margin(20)
      .caption(title, ("sans-serif", 40.0).into_font())
      .build_cartesian_2d(0.0..columns.len() as f64, 0.0..max_y)?;

    chart
      .configure_mesh()
      .disable_x_mesh()
      .light_line_style(WHITE)
      .label_style(("sans-serif", 30, &BLACK).into_text_style(&root))
      .y_desc(y_label)
      .x_labels(0)
      .y_label_formatter(&|y| format!("{:.0}", y))
      .draw()?;

    chart
      .draw_series(columns.iter().enumerate().map(|(i, c)| {
        let x = i as f64;
        Rectangle::new([(x + 0.15, 0.0), (x + 0.85, c.value)], c.color.mix(0.7).filled())
      }))
      .map_err(|e| anyhow::anyhow!("Failed to draw columns: {}", e))?;

    // name above the value, both above the bar
    let step = max_y * 0.04;
    chart
      .draw_series(columns.iter().enumerate().flat_map(|(i, c)| {
        let x = i as f64 + 0.3;
        [
          Text::new(format!("{:.1}%", c.value), (x, c.value + step), ("sans-serif", 30).into_font()),
          Text::new(c.label.clone(), (x, c.value + 2.5 * step), ("sans-serif", 30).into_font()),
        ]
      }))
      .map_err(|e| anyhow::anyhow!("Failed to draw column labels: {}", e))?;

    root
      .present()
      .map_err(|e| anyhow::anyhow!("Failed to present root: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flat_data_gets_a_drawable_range() {
    let data = [Data { x: 5, y: 2.0 }, Data { x: 5, y: 2.0 }];
    let b = Bounds::of(data.iter(), false).unwrap();
    assert!(b.max_x > b.min_x);
    assert!(b.max_y > b.min_y);
  }

  #[test]
  fn zero_line_extends_range() {
    let data = [Data { x: 0, y: 2.0 }, Data { x: 1, y: 3.0 }];
    let b = Bounds::of(data.iter(), true).unwrap();
    assert_eq!(b.min_y, 0.0);
    assert!(Bounds::of([].iter(), true).is_none());
  }

  #[test]
  fn bins_share_one_range() {
    let counts = bin_counts(&[0.0, 0.4, 0.5, 1.0, 2.0], 0.0, 0.5, 4);
    assert_eq!(counts, vec![2, 1, 1, 1]);
    // the maximum lands in the last bin, not past it
    assert_eq!(bin_counts(&[3.0], 0.0, 1.0, 3), vec![0, 0, 1]);
    assert_eq!(bin_counts(&[-1.0], 0.0, 1.0, 2), vec![1, 0]);
  }

  #[test]
  fn labels_dates() {
    assert_eq!(date_label(86_400_000), "1970-01-02");
  }
}
