pub use logger::*;
pub use plot::*;

pub mod logger;
pub mod macros;
pub mod plot;
