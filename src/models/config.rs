//! Configuration data model and validation

use crate::types::{AppError, Protocol, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest payload a single UDP datagram can carry over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Main application configuration
///
/// Built up in layers (defaults, environment, command line) and turned into
/// an immutable [`ProbeConfig`] once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host name or IP literal to probe
    #[serde(default)]
    pub host: String,

    /// Destination port
    #[serde(default)]
    pub port: Option<u16>,

    /// Probe transport
    #[serde(default)]
    pub protocol: Protocol,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay between round starts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Number of rounds, 0 runs until cancelled
    #[serde(default)]
    pub count: u32,

    #[serde(default = "default_allow_ipv4")]
    pub allow_ipv4: bool,

    #[serde(default)]
    pub allow_ipv6: bool,

    /// UDP payload as a hex string
    #[serde(default)]
    pub payload_hex: Option<String>,

    /// Name of the preset this configuration was derived from
    #[serde(default)]
    pub preset: Option<String>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            protocol: Protocol::default(),
            timeout_ms: default_timeout_ms(),
            delay_ms: default_delay_ms(),
            count: crate::defaults::DEFAULT_COUNT,
            allow_ipv4: default_allow_ipv4(),
            allow_ipv6: false,
            payload_hex: None,
            preset: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether the run only ends on cancellation
    pub fn is_nonstop(&self) -> bool {
        self.count == 0
    }

    /// Decode the configured payload, empty when none is set
    pub fn payload(&self) -> Result<Vec<u8>> {
        match self.payload_hex.as_deref().map(str::trim) {
            Some(hex_str) if !hex_str.is_empty() => Ok(hex::decode(hex_str)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::config("destination host is required"));
        }

        match self.port {
            None => return Err(AppError::config("port is required")),
            Some(0) => return Err(AppError::validation("invalid port `0`")),
            Some(_) => {}
        }

        if self.timeout_ms < 1 {
            return Err(AppError::validation("timeout must be at least 1ms"));
        }

        if self.delay_ms < 1 {
            return Err(AppError::validation("delay must be at least 1ms"));
        }

        if self.protocol.is_udp() {
            let payload = self.payload()?;
            if payload.is_empty() {
                return Err(AppError::PayloadRequired);
            }
            if payload.len() > MAX_UDP_PAYLOAD {
                return Err(AppError::validation(format!(
                    "UDP payload of {} bytes exceeds the {} byte datagram limit",
                    payload.len(),
                    MAX_UDP_PAYLOAD
                )));
            }
        }

        Ok(())
    }

    /// Validate and freeze into the snapshot the probe loop runs from
    pub fn probe_config(&self) -> Result<ProbeConfig> {
        self.validate()?;

        let payload = if self.protocol.is_udp() {
            self.payload()?
        } else {
            Vec::new()
        };

        Ok(ProbeConfig {
            host: self.host.trim().to_string(),
            protocol: self.protocol,
            port: self.port.unwrap_or_default(),
            timeout: self.timeout(),
            delay: self.delay(),
            count: self.count,
            payload,
            allow_ipv4: self.allow_ipv4,
            allow_ipv6: self.allow_ipv6,
        })
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(timeout) = std::env::var("PORTPING_TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORTPING_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(delay) = std::env::var("PORTPING_DELAY_MS") {
            self.delay_ms = delay.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORTPING_DELAY_MS value '{}': {}", delay, e)))?;
        }

        if let Ok(count) = std::env::var("PORTPING_COUNT") {
            self.count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORTPING_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(enable_color) = std::env::var("PORTPING_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORTPING_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(allow_ipv6) = std::env::var("PORTPING_ALLOW_IPV6") {
            self.allow_ipv6 = allow_ipv6.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORTPING_ALLOW_IPV6 value '{}': {}", allow_ipv6, e)))?;
        }

        Ok(())
    }
}

/// Immutable settings for one probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeConfig {
    pub host: String,
    pub protocol: Protocol,
    pub port: u16,
    pub timeout: Duration,
    pub delay: Duration,
    /// Round count, 0 means nonstop
    pub count: u32,
    /// Bytes sent per UDP probe, empty for TCP
    pub payload: Vec<u8>,
    pub allow_ipv4: bool,
    pub allow_ipv6: bool,
}

impl ProbeConfig {
    pub fn is_nonstop(&self) -> bool {
        self.count == 0
    }

    /// Whether another round should start after `completed_rounds`
    pub fn has_more_rounds(&self, completed_rounds: u64) -> bool {
        self.is_nonstop() || completed_rounds < u64::from(self.count)
    }

    /// Hex rendering of the UDP payload for the banner
    pub fn payload_hex(&self) -> Option<String> {
        if self.protocol.is_udp() && !self.payload.is_empty() {
            Some(hex::encode(&self.payload))
        } else {
            None
        }
    }
}

// Default value functions for serde
fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_delay_ms() -> u64 {
    crate::defaults::DEFAULT_DELAY.as_millis() as u64
}

fn default_allow_ipv4() -> bool {
    true
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp_config() -> Config {
        Config {
            host: "example.com".to_string(),
            port: Some(443),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout(), Duration::from_millis(1000));
        assert_eq!(config.delay(), Duration::from_millis(1000));
        assert!(config.is_nonstop());
        assert!(config.allow_ipv4);
        assert!(!config.allow_ipv6);
        assert_eq!(config.protocol, Protocol::Tcp);
    }

    #[test]
    fn test_tcp_config_is_valid() {
        assert!(tcp_config().validate().is_ok());
    }

    #[test]
    fn test_missing_host_and_port() {
        let mut config = tcp_config();
        config.host = "  ".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = tcp_config();
        config.port = None;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.port = Some(0);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_timeout_and_delay_bounds() {
        let mut config = tcp_config();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = tcp_config();
        config.delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_udp_requires_payload() {
        let mut config = tcp_config();
        config.protocol = Protocol::Udp;
        assert!(matches!(config.validate(), Err(AppError::PayloadRequired)));

        config.payload_hex = Some("".to_string());
        assert!(matches!(config.validate(), Err(AppError::PayloadRequired)));

        config.payload_hex = Some("1b00".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_hex_payload() {
        let mut config = tcp_config();
        config.protocol = Protocol::Udp;
        config.payload_hex = Some("xyz".to_string());
        assert!(matches!(config.validate(), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_tcp_ignores_payload() {
        let mut config = tcp_config();
        config.payload_hex = Some("deadbeef".to_string());
        let probe = config.probe_config().unwrap();
        assert!(probe.payload.is_empty());
        assert_eq!(probe.payload_hex(), None);
    }

    #[test]
    fn test_probe_config_snapshot() {
        let mut config = tcp_config();
        config.protocol = Protocol::Udp;
        config.port = Some(53);
        config.payload_hex = Some("ABCD".to_string());
        config.count = 3;
        config.timeout_ms = 250;

        let probe = config.probe_config().unwrap();
        assert_eq!(probe.port, 53);
        assert_eq!(probe.payload, vec![0xab, 0xcd]);
        assert_eq!(probe.payload_hex().as_deref(), Some("abcd"));
        assert_eq!(probe.timeout, Duration::from_millis(250));
        assert!(!probe.is_nonstop());
    }

    #[test]
    fn test_has_more_rounds() {
        let mut probe = tcp_config().probe_config().unwrap();
        assert!(probe.has_more_rounds(1_000_000));

        probe.count = 2;
        assert!(probe.has_more_rounds(0));
        assert!(probe.has_more_rounds(1));
        assert!(!probe.has_more_rounds(2));
    }
}
