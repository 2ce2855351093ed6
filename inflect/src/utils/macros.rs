#[macro_export]
macro_rules! trunc {
  ($num:expr, $decimals:expr) => {{
    let factor = 10.0_f64.powi($decimals);
    ($num * factor).round() / factor
  }};
}

#[cfg(test)]
mod tests {
  #[test]
  fn truncates_to_decimals() {
    assert_eq!(trunc!(1.23456, 2), 1.23);
    assert_eq!(trunc!(-0.0049, 2), -0.0);
  }
}
