//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::{env::EnvManager, presets::find_preset},
    dns::parse_ip_literal,
    error::{AppError, Result},
    models::Config,
    types::Protocol,
};
use std::net::Ipv6Addr;

/// Positional arguments split into host, port and payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: Option<u16>,
    /// Trailing hex payload, only honored for UDP
    pub payload: Option<String>,
}

impl Destination {
    /// Interpret `<destination> [port] [payload]`
    ///
    /// The port may be embedded (`host:port`, `[v6]:port`, or an
    /// unbracketed IPv6 address followed by `:port`), in which case the
    /// payload moves up one position. An IPv6 literal such as `::1:80` only
    /// gives up its last group as a port when no other argument follows it.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let Some(raw) = args.first() else {
            return Ok(Self::default());
        };

        let (host, port_text, next) = match split_host_port(raw, args.len() > 1) {
            Some((host, port)) => (host, Some(port), 1),
            None => (
                raw.trim_start_matches('[').trim_end_matches(']').to_string(),
                args.get(1).cloned(),
                2,
            ),
        };

        let port = match port_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(parse_port(text)?),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            payload: args.get(next).cloned().filter(|p| !p.trim().is_empty()),
        })
    }
}

/// Split an embedded port off a destination
fn split_host_port(raw: &str, more_args: bool) -> Option<(String, String)> {
    if parse_ip_literal(raw).is_some() {
        return if more_args {
            None
        } else {
            split_trailing_port(raw)
        };
    }

    if let Some(rest) = raw.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((host.to_string(), port.to_string()));
    }

    match raw.matches(':').count() {
        0 => None,
        1 => {
            let (host, port) = raw.split_once(':')?;
            (!host.is_empty()).then(|| (host.to_string(), port.to_string()))
        }
        // Unbracketed IPv6 with a trailing port
        _ => {
            let (host, port) = raw.rsplit_once(':')?;
            host.parse::<Ipv6Addr>()
                .ok()
                .map(|_| (host.to_string(), port.to_string()))
        }
    }
}

/// `::1:80` read as `::1` port `80`
fn split_trailing_port(raw: &str) -> Option<(String, String)> {
    if raw.matches(':').count() < 2 {
        return None;
    }
    let (host, port) = raw.rsplit_once(':')?;
    host.parse::<Ipv6Addr>().ok()?;
    port.parse::<u16>().ok()?;
    Some((host.to_string(), port.to_string()))
}

fn parse_port(text: &str) -> Result<u16> {
    text.parse::<u16>()
        .map_err(|_| AppError::parse(format!("invalid port `{}`", text)))
}

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        if let Some(issue) = EnvManager::validate_current_env().into_iter().next() {
            return Err(issue);
        }
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        let cli = &self.cli;
        self.cli.validate().map_err(AppError::config)?;

        if let Some(timeout) = cli.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(delay) = cli.delay {
            config.delay_ms = delay;
        }
        if let Some(count) = cli.count {
            config.count = count;
        }

        if cli.ipv4 || cli.ipv6 {
            config.allow_ipv4 = cli.ipv4;
            config.allow_ipv6 = cli.ipv6;
        }

        let explicit_protocol = if cli.udp {
            Some(Protocol::Udp)
        } else if cli.tcp {
            Some(Protocol::Tcp)
        } else {
            None
        };
        if let Some(protocol) = explicit_protocol {
            config.protocol = protocol;
        }

        config.enable_color = if cli.color || cli.no_color {
            cli.use_colors()
        } else {
            config.enable_color && cli.use_colors()
        };
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        let destination = Destination::from_args(&cli.args)?;
        config.host = destination.host;
        if destination.port.is_some() {
            config.port = destination.port;
        }

        if let Some(payload) = &cli.payload {
            config.payload_hex = Some(payload.clone());
        }

        if let Some(name) = cli.selected_preset() {
            let preset = find_preset(&name)
                .ok_or_else(|| AppError::config(format!("invalid preset `{}`", name)))?;

            if config.port.is_none() {
                config.port = Some(preset.port);
            }
            if explicit_protocol.is_none() {
                config.protocol = preset.protocol;
            }
            let has_payload = config.payload_hex.as_deref().is_some_and(|p| !p.trim().is_empty());
            if config.protocol.is_udp() && !has_payload {
                config.payload_hex = preset.payload_hex.map(str::to_string);
            }
            config.preset = Some(preset.name.to_string());
        }

        // Positional payload wins over flag and preset payloads
        if config.protocol.is_udp() {
            if let Some(payload) = destination.payload {
                config.payload_hex = Some(payload);
            }
        }

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Host: {}", config.host));
    summary.push(format!(
        "Port: {}",
        config.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    summary.push(format!("Protocol: {}", config.protocol));
    if let Some(preset) = &config.preset {
        summary.push(format!("Preset: {}", preset));
    }
    if config.protocol.is_udp() {
        summary.push(format!("Payload: {}", config.payload_hex.as_deref().unwrap_or("-")));
    }
    summary.push(format!("Timeout: {}ms", config.timeout_ms));
    summary.push(format!("Delay: {}ms", config.delay_ms));
    summary.push(if config.is_nonstop() {
        "Count: nonstop".to_string()
    } else {
        format!("Count: {}", config.count)
    });
    summary.push(format!("IPv4: {}, IPv6: {}", config.allow_ipv4, config.allow_ipv6));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
