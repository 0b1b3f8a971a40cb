//! Demo data used when DEMO_MODE=true

pub mod data;
