//! Configuration validation utilities and rules

use crate::{dns::parse_ip_literal, error::Result, models::Config};
use colored::Colorize;
use std::net::IpAddr;

/// Largest UDP payload that fits a 1500 byte Ethernet frame without fragmenting
pub const UNFRAGMENTED_UDP_PAYLOAD: usize = 1472;

/// Configuration validator producing non-fatal warnings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run hard validation, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_timing(config));
        warnings.extend(Self::validate_payload(config)?);
        warnings.extend(Self::validate_families(config));
        Ok(warnings)
    }

    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_ms > config.delay_ms {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Timeout of {}ms exceeds the {}ms delay, slow rounds will start the next one immediately",
                    config.timeout_ms, config.delay_ms
                ),
            ));
        }

        if config.delay_ms < 100 && config.is_nonstop() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Probing nonstop every {}ms", config.delay_ms),
            ));
        }

        warnings
    }

    fn validate_payload(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        if config.protocol.is_udp() {
            let len = config.payload()?.len();
            if len > UNFRAGMENTED_UDP_PAYLOAD {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "UDP payload of {} bytes exceeds {} bytes and may be fragmented",
                        len, UNFRAGMENTED_UDP_PAYLOAD
                    ),
                ));
            }
        } else if config.payload_hex.as_deref().is_some_and(|p| !p.trim().is_empty()) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Payload is ignored for TCP probes".to_string(),
            ));
        }

        Ok(warnings)
    }

    /// Literal destinations must belong to an allowed family
    fn validate_families(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !config.allow_ipv4 && !config.allow_ipv6 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Both IPv4 and IPv6 are disabled, no address can be probed".to_string(),
            ));
            return warnings;
        }

        if let Some(ip) = parse_ip_literal(&config.host) {
            let allowed = match ip {
                IpAddr::V4(_) => config.allow_ipv4,
                IpAddr::V6(_) => config.allow_ipv6,
            };
            if !allowed {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Destination {} is excluded by the address family flags", ip),
                ));
            }
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if !use_color {
            return format!("{} {}", tag, self.message);
        }
        let tag = match self.level {
            ValidationLevel::Info => tag.blue(),
            ValidationLevel::Warning => tag.yellow(),
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
