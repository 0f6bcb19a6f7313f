pub mod types;
pub mod classification;

pub use types::*;
pub use classification::*;
