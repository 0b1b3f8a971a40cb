//! Human-readable rendering of check values

pub mod formatter;

// Re-export commonly used items
pub use formatter::{
    format_count, format_latency_ms, format_ops_per_second, format_percent, format_rate,
};
