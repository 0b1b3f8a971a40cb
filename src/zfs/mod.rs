//! `zpool iostat` collection, parsing and record emission

pub mod collector;
pub mod emitter;
pub mod error;
pub mod fields;
pub mod header;
pub mod normalize;
pub mod record;


// Re-export commonly used items
pub use collector::{IostatCollector, ParsedLine};
pub use emitter::Emitter;
pub use error::CollectError;
pub use normalize::MetricValue;
