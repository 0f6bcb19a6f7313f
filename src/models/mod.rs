pub mod analytics;
pub mod asset;
pub mod snapshot;
pub mod transaction;

pub use analytics::*;
pub use asset::*;
pub use snapshot::*;
pub use transaction::*;
