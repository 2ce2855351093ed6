use thiserror::Error;

pub type InflectResult<T = ()> = Result<T, InvalidInput>;

/// Every way the numeric core can reject its input.
/// Raised before any computation starts, so no partial result ever escapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
  #[error("{op} requires at least {required} samples, got {actual}")]
  TooShort {
    op: &'static str,
    required: usize,
    actual: usize,
  },

  #[error("step size must be positive and finite, got {0}")]
  NonPositiveStep(f64),

  #[error("window size must be positive, got {0}")]
  NonPositiveWindow(usize),

  #[error("{op} requires series of equal length, got {left} and {right}")]
  LengthMismatch {
    op: &'static str,
    left: usize,
    right: usize,
  },

  #[error("{op} requires aligned series, timestamps differ at index {index}")]
  Misaligned { op: &'static str, index: usize },

  #[error("timestamps must be strictly increasing, index {index} has {x} after {prev}")]
  NotIncreasing { index: usize, prev: i64, x: i64 },

  #[error("{op} found no defined samples")]
  Undefined { op: &'static str },
}
