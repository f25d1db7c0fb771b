//! portping
//!
//! Measures TCP connect and UDP request/response latency to every address a
//! host resolves to, round after round, and prints per-address statistics
//! when the run completes or is interrupted.

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use dns::AddressResolver;
pub use error::{AppError, Result};
pub use executor::ProbeScheduler;
pub use models::{Address, AttemptReport, Banner, Config, ProbeConfig, ProbeOutcome, RunSummary, SummaryRow};
pub use output::{ColoredFormatter, ConsoleReporter, OutputFormatter, OutputFormatterFactory, PlainFormatter, Reporter};
pub use probe::{ProbeContext, ProbeError, Prober, TcpProber, UdpProber};
pub use stats::{Stats, StatsTable};
pub use types::{IpFamily, Protocol, RunState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata stamped by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Version line with build metadata for debug output
pub fn long_version() -> String {
    format!(
        "{} {} ({} {}, built {})",
        PKG_NAME, VERSION, GIT_COMMIT, TARGET_TRIPLE, BUILD_TIME
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
    /// Zero rounds means run until interrupted
    pub const DEFAULT_COUNT: u32 = 0;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_contains_metadata() {
        let version = long_version();
        assert!(version.starts_with(PKG_NAME));
        assert!(version.contains(VERSION));
        assert!(version.contains(GIT_COMMIT));
    }
}
