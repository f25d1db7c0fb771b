//! Host resolution for probe targets


use crate::{
    error::{AppError, Result},
    models::Address,
    types::IpFamily,
};
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    net::IpAddr,
    time::Duration,
};
use trust_dns_resolver::{
    config::{LookupIpStrategy, ResolverConfig, ResolverOpts},
    error::ResolveError,
    system_conf,
    TokioAsyncResolver,
};

/// Name lookup backend
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn lookup_ip(&self, host: &str) -> std::result::Result<Vec<IpAddr>, ResolveError>;
}

/// Lookup through the operating system's resolver configuration
pub struct SystemLookup {
    resolver: TokioAsyncResolver,
}

impl SystemLookup {
    /// Build from the system configuration, falling back to the resolver's
    /// built-in upstreams when none is readable.
    pub fn new() -> Self {
        let (config, mut opts) = system_conf::read_system_conf()
            .unwrap_or_else(|_| (ResolverConfig::default(), ResolverOpts::default()));

        // Both families are needed before the allow-flags filter runs
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl Default for SystemLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostLookup for SystemLookup {
    async fn lookup_ip(&self, host: &str) -> std::result::Result<Vec<IpAddr>, ResolveError> {
        let response = self.resolver.lookup_ip(host).await?;
        Ok(response.iter().collect())
    }
}

/// Fixed host table, for tests and offline use
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: HashMap<String, Vec<IpAddr>>,
    delay: Option<Duration>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, ips: Vec<IpAddr>) -> Self {
        self.records.insert(host.to_ascii_lowercase(), ips);
        self
    }

    /// Delay every answer, to exercise lookup timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl HostLookup for StaticLookup {
    async fn lookup_ip(&self, host: &str) -> std::result::Result<Vec<IpAddr>, ResolveError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records
            .get(&host.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ResolveError::from(format!("no record found for {}", host)))
    }
}

/// Turns a host string into the filtered, deduplicated address list
pub struct AddressResolver<L = SystemLookup> {
    lookup: L,
}

impl AddressResolver<SystemLookup> {
    pub fn system() -> Self {
        Self::new(SystemLookup::new())
    }
}

impl<L: HostLookup> AddressResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve `host` honoring the family allow-flags
    ///
    /// IP literals never reach the lookup backend. Result order follows the
    /// backend; presentation order is applied with [`sort_addresses`].
    pub async fn resolve(
        &self,
        host: &str,
        allow_ipv4: bool,
        allow_ipv6: bool,
        timeout: Duration,
    ) -> Result<Vec<Address>> {
        let host = host.trim();

        if !allow_ipv4 && !allow_ipv6 {
            return Err(AppError::no_addresses_found(host));
        }

        if let Some(ip) = parse_ip_literal(host) {
            let address = Address::new(ip);
            return if family_allowed(address.family(), allow_ipv4, allow_ipv6) {
                Ok(vec![address])
            } else {
                Err(AppError::no_addresses_found(host))
            };
        }

        let ips = match tokio::time::timeout(timeout, self.lookup.lookup_ip(host)).await {
            Ok(Ok(ips)) => ips,
            Ok(Err(e)) => return Err(AppError::resolve_failed(host, e.to_string())),
            Err(_) => {
                return Err(AppError::resolve_failed(
                    host,
                    format!("lookup timed out after {}ms", timeout.as_millis()),
                ))
            }
        };

        let addresses = filter_addresses(ips, allow_ipv4, allow_ipv6);
        if addresses.is_empty() {
            return Err(AppError::no_addresses_found(host));
        }
        Ok(addresses)
    }
}

/// Parse a bare or bracketed IP literal
pub fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let unbracketed = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    unbracketed.parse().ok()
}

fn family_allowed(family: IpFamily, allow_ipv4: bool, allow_ipv6: bool) -> bool {
    match family {
        IpFamily::V4 => allow_ipv4,
        IpFamily::V6 => allow_ipv6,
    }
}

/// Classify, filter by family and drop repeated addresses
pub fn filter_addresses(ips: Vec<IpAddr>, allow_ipv4: bool, allow_ipv6: bool) -> Vec<Address> {
    let mut seen = HashSet::new();
    ips.into_iter()
        .map(Address::new)
        .filter(|address| family_allowed(address.family(), allow_ipv4, allow_ipv6))
        .filter(|address| seen.insert(address.value.clone()))
        .collect()
}

/// Presentation order: IPv4 before IPv6, then by string within a family
pub fn sort_addresses(addresses: &mut [Address]) {
    addresses.sort_by(|a, b| {
        a.family()
            .cmp(&b.family())
            .then_with(|| a.value.cmp(&b.value))
    });
}
