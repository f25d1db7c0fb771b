//! Per-address latency accumulation
//!
//! [`update`] folds one probe outcome into a [`Stats`] record. The
//! [`StatsTable`] holds one record per resolved address for the lifetime of
//! a run and is owned by the scheduler alone.


use crate::models::{Address, ProbeOutcome, SummaryRow};
use crate::probe::ProbeError;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Running aggregate for one address
///
/// `minimum`, `maximum` and `total` only ever see successful attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    attempts: u64,
    successes: u64,
    failures: u64,
    minimum: Option<Duration>,
    maximum: Option<Duration>,
    total: Duration,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn minimum(&self) -> Option<Duration> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<Duration> {
        self.maximum
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Mean successful latency, `None` before the first success
    pub fn average(&self) -> Option<Duration> {
        if self.successes == 0 {
            return None;
        }
        let nanos = self.total.as_nanos() / u128::from(self.successes);
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }

    /// Failed attempts as a percentage of all attempts
    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64 * 100.0
        }
    }

    pub fn record(&mut self, outcome: &ProbeOutcome) {
        update(self, outcome.duration, outcome.error.as_ref());
    }

    pub fn summary_row(&self, address: &str) -> SummaryRow {
        SummaryRow {
            address: address.to_string(),
            attempts: self.attempts,
            successes: self.successes,
            failures: self.failures,
            minimum: self.minimum,
            maximum: self.maximum,
            average: self.average(),
            failure_rate: self.failure_rate(),
        }
    }
}

/// Fold one attempt into `stats`
pub fn update(stats: &mut Stats, duration: Duration, error: Option<&ProbeError>) {
    stats.attempts += 1;

    if error.is_some() {
        stats.failures += 1;
        return;
    }

    stats.successes += 1;
    stats.total = stats.total.saturating_add(duration);
    stats.minimum = Some(stats.minimum.map_or(duration, |min| min.min(duration)));
    stats.maximum = Some(stats.maximum.map_or(duration, |max| max.max(duration)));
}

/// Address-keyed statistics in resolved order
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    entries: Vec<(String, Stats)>,
    index: HashMap<String, usize>,
}

impl StatsTable {
    /// One zeroed record per address; duplicates share a record
    pub fn new(addresses: &[Address]) -> Self {
        let mut table = Self::default();
        for address in addresses {
            if !table.index.contains_key(&address.value) {
                table.index.insert(address.value.clone(), table.entries.len());
                table.entries.push((address.value.clone(), Stats::new()));
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&Stats> {
        self.index.get(address).map(|&i| &self.entries[i].1)
    }

    /// Record an outcome; returns false for an address the table never saw
    pub fn record(&mut self, address: &str, outcome: &ProbeOutcome) -> bool {
        match self.index.get(address) {
            Some(&i) => {
                self.entries[i].1.record(outcome);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stats)> {
        self.entries.iter().map(|(address, stats)| (address.as_str(), stats))
    }

    /// Summary rows for addresses with at least one attempt
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.iter()
            .filter(|(_, stats)| stats.attempts() > 0)
            .map(|(address, stats)| stats.summary_row(address))
            .collect()
    }

    pub fn total_attempts(&self) -> u64 {
        self.entries.iter().map(|(_, stats)| stats.attempts()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn address(text: &str) -> Address {
        Address::new(text.parse::<IpAddr>().unwrap())
    }

    #[test]
    fn test_successes_track_min_max_total() {
        let mut stats = Stats::new();
        update(&mut stats, ms(10), None);
        update(&mut stats, ms(20), None);
        update(&mut stats, ms(5), None);

        assert_eq!(stats.minimum(), Some(ms(5)));
        assert_eq!(stats.maximum(), Some(ms(20)));
        assert_eq!(stats.total(), ms(35));
        assert_eq!(stats.successes(), 3);
        assert_eq!(stats.attempts(), 3);
        assert_eq!(stats.failures(), 0);
    }

    #[test]
    fn test_failures_do_not_touch_latency() {
        let mut stats = Stats::new();
        update(&mut stats, ms(40), Some(&ProbeError::Timeout));
        assert_eq!(stats.attempts(), 1);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.minimum(), None);
        assert_eq!(stats.maximum(), None);
        assert_eq!(stats.total(), Duration::ZERO);
        assert_eq!(stats.average(), None);

        update(&mut stats, ms(8), None);
        assert_eq!(stats.minimum(), Some(ms(8)));
        assert_eq!(stats.maximum(), Some(ms(8)));
    }

    #[test]
    fn test_zero_duration_success_is_kept_as_minimum() {
        let mut stats = Stats::new();
        update(&mut stats, Duration::ZERO, None);
        update(&mut stats, ms(3), None);
        assert_eq!(stats.minimum(), Some(Duration::ZERO));
    }

    #[test]
    fn test_average_and_failure_rate() {
        let mut stats = Stats::new();
        update(&mut stats, ms(10), None);
        update(&mut stats, ms(30), None);
        update(&mut stats, ms(99), Some(&ProbeError::Refused));
        update(&mut stats, ms(99), Some(&ProbeError::Refused));

        assert_eq!(stats.average(), Some(ms(20)));
        assert!((stats.failure_rate() - 50.0).abs() < f64::EPSILON);
        assert_eq!(Stats::new().failure_rate(), 0.0);
    }

    #[test]
    fn test_table_keeps_resolved_order_and_skips_idle_rows() {
        let addresses = vec![address("10.0.0.2"), address("10.0.0.1"), address("::1")];
        let mut table = StatsTable::new(&addresses);
        assert_eq!(table.len(), 3);

        assert!(table.record("::1", &ProbeOutcome::success(ms(2))));
        assert!(table.record("10.0.0.2", &ProbeOutcome::failure(ms(50), ProbeError::Timeout)));
        assert!(!table.record("192.0.2.1", &ProbeOutcome::success(ms(1))));

        let rows = table.summary_rows();
        let order: Vec<&str> = rows.iter().map(|row| row.address.as_str()).collect();
        assert_eq!(order, vec!["10.0.0.2", "::1"]);
        assert_eq!(table.total_attempts(), 2);
        assert_eq!(table.get("10.0.0.1").unwrap().attempts(), 0);
    }

    #[test]
    fn test_table_dedups_addresses() {
        let addresses = vec![address("127.0.0.1"), address("127.0.0.1")];
        let table = StatsTable::new(&addresses);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_summary_row_fields() {
        let mut stats = Stats::new();
        stats.record(&ProbeOutcome::success(ms(4)));
        stats.record(&ProbeOutcome::failure(ms(1), ProbeError::Refused));

        let row = stats.summary_row("192.0.2.10");
        assert_eq!(row.address, "192.0.2.10");
        assert_eq!(row.attempts, 2);
        assert_eq!(row.successes, 1);
        assert_eq!(row.failures, 1);
        assert_eq!(row.average, Some(ms(4)));
        assert!((row.failure_rate - 50.0).abs() < f64::EPSILON);
    }
}
