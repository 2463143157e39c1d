pub mod error;
pub mod thresholds;
pub mod types;

pub use error::*;
pub use thresholds::*;
pub use types::*;
