//! Probe results and report data models

use crate::probe::ProbeError;
use crate::types::{IpFamily, Protocol, RunState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// A resolved destination address
///
/// The canonical string form is the identity key used for statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub value: String,
    pub ip: IpAddr,
}

impl Address {
    /// Build an address, unwrapping IPv4-mapped IPv6 to its IPv4 form
    pub fn new(ip: IpAddr) -> Self {
        let ip = match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
            v4 => v4,
        };
        Self {
            value: ip.to_string(),
            ip,
        }
    }

    pub fn family(&self) -> IpFamily {
        IpFamily::of(&self.ip)
    }

    pub fn is_ipv4(&self) -> bool {
        self.family() == IpFamily::V4
    }

    pub fn is_ipv6(&self) -> bool {
        !self.is_ipv4()
    }

    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.ip, port)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Result of one probe attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub duration: Duration,
    pub error: Option<ProbeError>,
}

impl ProbeOutcome {
    pub fn success(duration: Duration) -> Self {
        Self { duration, error: None }
    }

    pub fn failure(duration: Duration, error: ProbeError) -> Self {
        Self {
            duration,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the attempt was cut short by run-level cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(ProbeError::Cancelled))
    }
}

/// One line of per-attempt output
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    /// 1-based round number
    pub round: u64,
    /// 1-based position in the address list, only set with several addresses
    pub sub_index: Option<usize>,
    pub address: String,
    /// Width the address column is padded to
    pub address_width: usize,
    pub duration: Duration,
    pub error: Option<ProbeError>,
}

impl AttemptReport {
    /// Attempt label, `N` or `N.sub`
    pub fn label(&self) -> String {
        match self.sub_index {
            Some(sub) => format!("{}.{}", self.round, sub),
            None => self.round.to_string(),
        }
    }
}

/// Run header emitted once before the first round
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub host: String,
    pub protocol: Protocol,
    pub port: u16,
    pub addresses: Vec<Address>,
    pub payload_hex: Option<String>,
}

/// Aggregated figures for one address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub address: String,
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub minimum: Option<Duration>,
    pub maximum: Option<Duration>,
    pub average: Option<Duration>,
    /// Failure share in percent
    pub failure_rate: f64,
}

/// Final statistics emitted exactly once per run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub host: String,
    pub protocol: Protocol,
    pub port: u16,
    pub state: RunState,
    pub rounds_completed: u64,
    /// Rows for addresses with at least one attempt, in resolved order
    pub rows: Vec<SummaryRow>,
    /// Longest resolved address, including ones left without a row
    pub address_width: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_attempts(&self) -> u64 {
        self.rows.iter().map(|row| row.attempts).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.rows.iter().map(|row| row.failures).sum()
    }

    pub fn was_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_address_classification() {
        let v4 = Address::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)));
        assert!(v4.is_ipv4());
        assert_eq!(v4.value, "192.0.2.7");

        let v6 = Address::new(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert!(v6.is_ipv6());
        assert_eq!(v6.value, "::1");
        assert_eq!(v6.socket_addr(80).to_string(), "[::1]:80");
    }

    #[test]
    fn test_mapped_address_becomes_ipv4() {
        let mapped: IpAddr = "::ffff:10.1.2.3".parse().unwrap();
        let address = Address::new(mapped);
        assert!(address.is_ipv4());
        assert_eq!(address.value, "10.1.2.3");
        assert_eq!(address.socket_addr(22).to_string(), "10.1.2.3:22");
    }

    #[test]
    fn test_attempt_label() {
        let mut report = AttemptReport {
            round: 4,
            sub_index: None,
            address: "127.0.0.1".to_string(),
            address_width: 9,
            duration: Duration::from_millis(3),
            error: None,
        };
        assert_eq!(report.label(), "4");

        report.sub_index = Some(2);
        assert_eq!(report.label(), "4.2");
    }

    #[test]
    fn test_outcome_helpers() {
        let ok = ProbeOutcome::success(Duration::from_millis(1));
        assert!(ok.is_success());
        assert!(!ok.is_cancelled());

        let cancelled = ProbeOutcome::failure(Duration::ZERO, ProbeError::Cancelled);
        assert!(!cancelled.is_success());
        assert!(cancelled.is_cancelled());
    }
}
