//! Data models and structures for portping

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{Config, ProbeConfig};
pub use metrics::{Address, AttemptReport, Banner, ProbeOutcome, RunSummary, SummaryRow};
