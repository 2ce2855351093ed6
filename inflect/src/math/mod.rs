pub use calculus::*;
pub use statistics::*;

pub mod calculus;
pub mod statistics;
