pub mod analysis;
pub mod critical;
pub mod data;
pub mod error;
pub mod math;
pub mod provider;
pub mod trend;
pub mod utils;

pub use analysis::*;
pub use critical::*;
pub use data::*;
pub use error::*;
pub use math::*;
pub use provider::*;
pub use trend::*;
pub use utils::*;
