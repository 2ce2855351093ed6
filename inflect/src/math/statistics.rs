pub fn mean(x: &[f64]) -> f64 {
  let sum: f64 = x.iter().sum();
  let n: f64 = x.len() as f64;
  sum / n
}

/// Share of samples strictly above zero. Undefined samples count toward the total.
pub fn fraction_positive(x: &[Option<f64>]) -> f64 {
  let positive = x.iter().filter(|v| matches!(v, Some(v) if *v > 0.0)).count();
  positive as f64 / x.len() as f64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fraction_counts_undefined_as_not_positive() {
    let x = [Some(1.0), Some(0.0), None, Some(-2.0)];
    assert_eq!(fraction_positive(&x), 0.25);
  }

  #[test]
  fn mean_of_values() {
    assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
  }
}
