//! Probe scheduling
//!
//! [`ProbeScheduler`] drives the run: resolve once, then repeat rounds that
//! probe every address in order, one probe in flight at a time, until the
//! round count is reached or the run is cancelled. Cancellation is observed
//! before each round, before each probe, inside each probe and during the
//! inter-round wait. Every run that starts probing ends with exactly one
//! summary.

use crate::{
    dns::{sort_addresses, AddressResolver, HostLookup},
    error::{AppError, Result},
    logging::{Logger, ProbeLogger},
    models::{Address, AttemptReport, Banner, ProbeConfig, RunSummary},
    output::Reporter,
    probe::{create_prober, ProbeContext, Prober},
    stats::StatsTable,
    types::RunState,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Round-robin probe loop over the resolved addresses
pub struct ProbeScheduler {
    config: ProbeConfig,
    prober: Box<dyn Prober>,
    cancel: CancellationToken,
    logger: ProbeLogger,
    state: RunState,
}

impl ProbeScheduler {
    pub fn new(config: ProbeConfig, prober: Box<dyn Prober>, cancel: CancellationToken) -> Self {
        Self {
            config,
            prober,
            cancel,
            logger: ProbeLogger::from_logger(&Logger::new("PROBE")),
            state: RunState::Idle,
        }
    }

    /// Build with the prober matching the configured protocol
    pub fn from_config(config: ProbeConfig, cancel: CancellationToken) -> Result<Self> {
        let prober = create_prober(&config)?;
        Ok(Self::new(config, prober, cancel))
    }

    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Resolve the configured host, then probe until done
    ///
    /// Resolution errors abort before anything is reported. Cancellation
    /// while resolving yields [`AppError::Cancelled`].
    pub async fn run<L: HostLookup>(
        &mut self,
        resolver: &AddressResolver<L>,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary> {
        if self.state != RunState::Idle {
            return Err(AppError::internal("probe scheduler can only run once"));
        }

        let host = self.config.host.clone();
        let resolved = tokio::select! {
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            resolved = resolver.resolve(
                &host,
                self.config.allow_ipv4,
                self.config.allow_ipv6,
                self.config.timeout,
            ) => resolved,
        };

        let mut addresses = match resolved {
            Ok(addresses) => addresses,
            Err(e) => {
                self.logger.log_resolution_failed(&host, &e).await;
                return Err(e);
            }
        };
        sort_addresses(&mut addresses);
        self.logger.log_resolved(&host, &addresses).await;

        Ok(self.run_addresses(addresses, reporter).await)
    }

    /// Probe an already resolved, ordered address list
    pub async fn run_addresses(&mut self, addresses: Vec<Address>, reporter: &mut dyn Reporter) -> RunSummary {
        let started = Instant::now();
        self.state = RunState::Running;

        let mut stats = StatsTable::new(&addresses);
        let address_width = addresses.iter().map(|a| a.value.len()).max().unwrap_or(0);
        let numbered = addresses.len() > 1;

        reporter.banner(&Banner {
            host: self.config.host.clone(),
            protocol: self.config.protocol,
            port: self.config.port,
            addresses: addresses.clone(),
            payload_hex: self.config.payload_hex(),
        });

        let mut completed_rounds: u64 = 0;

        'rounds: while self.config.has_more_rounds(completed_rounds) {
            if self.cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }

            let round = completed_rounds + 1;
            let round_start = Instant::now();
            self.logger.log_round_start(round, addresses.len()).await;

            for (idx, address) in addresses.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    self.state = RunState::Cancelled;
                    break 'rounds;
                }

                let target = address.socket_addr(self.config.port);
                let ctx = ProbeContext::new(self.config.timeout, &self.cancel);
                let outcome = self.prober.probe(target, &ctx).await;

                // Interrupted attempts are not failures
                if outcome.is_cancelled() && self.cancel.is_cancelled() {
                    self.state = RunState::Cancelled;
                    break 'rounds;
                }

                self.logger.log_probe(round, target, &outcome).await;
                stats.record(&address.value, &outcome);
                reporter.attempt(&AttemptReport {
                    round,
                    sub_index: numbered.then_some(idx + 1),
                    address: address.value.clone(),
                    address_width,
                    duration: outcome.duration,
                    error: outcome.error,
                });
            }

            completed_rounds = round;

            if self.config.has_more_rounds(completed_rounds) {
                // Slow rounds start the next one at once, without catching up
                if let Some(remaining) = self.config.delay.checked_sub(round_start.elapsed()) {
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            self.state = RunState::Cancelled;
                            break 'rounds;
                        }
                        _ = tokio::time::sleep(remaining) => {}
                    }
                }
            }
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }

        let summary = RunSummary {
            host: self.config.host.clone(),
            protocol: self.config.protocol,
            port: self.config.port,
            state: self.state,
            rounds_completed: completed_rounds,
            rows: stats.summary_rows(),
            address_width,
            elapsed: started.elapsed(),
        };
        reporter.summary(&summary);
        self.logger.log_run_complete(&summary).await;
        summary
    }
}
