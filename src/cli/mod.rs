//! Command-line interface

use crate::config::{
    env::EnvManager,
    presets::{find_preset, preset_names, presets_help},
};
use clap::{Args, Parser};

/// Measure TCP connect and UDP round-trip latency to a host and port
#[derive(Parser, Debug, Clone)]
#[command(name = "portping")]
#[command(version, about, long_about = None)]
#[command(after_help = help_footer())]
pub struct Cli {
    /// Destination host, optional port and optional UDP payload in hex
    #[arg(value_name = "DESTINATION [PORT] [UDP HEX PAYLOAD]")]
    pub args: Vec<String>,

    /// Per-attempt timeout in milliseconds [default: 1000]
    #[arg(short, long, value_name = "MS", value_parser = parse_millis)]
    pub timeout: Option<u64>,

    /// Delay between the start of consecutive rounds in milliseconds [default: 1000]
    #[arg(short, long, value_name = "MS", value_parser = parse_millis)]
    pub delay: Option<u64>,

    /// Stop after this many rounds, 0 keeps going until interrupted
    #[arg(short, long, value_name = "N")]
    pub count: Option<u32>,

    /// Probe IPv4 addresses (default when neither -4 nor -6 is given)
    #[arg(short = '4', long = "ipv4")]
    pub ipv4: bool,

    /// Probe IPv6 addresses
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,

    /// TCP connect probe (default)
    #[arg(long, conflicts_with = "udp")]
    pub tcp: bool,

    /// UDP probe, requires a payload
    #[arg(long)]
    pub udp: bool,

    /// UDP payload as a hex string
    #[arg(long, value_name = "HEX")]
    pub payload: Option<String>,

    /// Use a named preset
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    #[command(flatten)]
    pub presets: PresetFlags,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

/// One shortcut flag per preset
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Preset shortcuts")]
pub struct PresetFlags {
    /// DNS query, udp 53
    #[arg(long)]
    pub dns: bool,
    /// NTP request, udp 123
    #[arg(long)]
    pub ntp: bool,
    /// STUN binding request, udp 3478
    #[arg(long)]
    pub stun: bool,
    /// tcp 21
    #[arg(long)]
    pub ftp: bool,
    /// tcp 22
    #[arg(long)]
    pub ssh: bool,
    /// tcp 25
    #[arg(long)]
    pub smtp: bool,
    /// tcp 80
    #[arg(long)]
    pub http: bool,
    /// tcp 110
    #[arg(long)]
    pub pop3: bool,
    /// tcp 143
    #[arg(long)]
    pub imap: bool,
    /// tcp 443
    #[arg(long)]
    pub https: bool,
    /// tcp 3306
    #[arg(long)]
    pub mysql: bool,
    /// tcp 5432
    #[arg(long)]
    pub postgres: bool,
}

impl PresetFlags {
    /// Names of every shortcut that was set
    pub fn selected(&self) -> Vec<&'static str> {
        [
            ("dns", self.dns),
            ("ntp", self.ntp),
            ("stun", self.stun),
            ("ftp", self.ftp),
            ("ssh", self.ssh),
            ("smtp", self.smtp),
            ("http", self.http),
            ("pop3", self.pop3),
            ("imap", self.imap),
            ("https", self.https),
            ("mysql", self.mysql),
            ("postgres", self.postgres),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.tcp && self.udp {
            return Err("Cannot specify both --tcp and --udp".to_string());
        }

        if self.args.len() > 3 {
            return Err(format!(
                "Too many arguments: expected DESTINATION [PORT] [UDP HEX PAYLOAD], got {}",
                self.args.len()
            ));
        }

        let shortcuts = self.presets.selected();
        if shortcuts.len() > 1 {
            return Err(format!("Multiple presets selected: --{}", shortcuts.join(", --")));
        }

        if let (Some(named), Some(shortcut)) = (self.preset.as_deref(), shortcuts.first()) {
            if !named.eq_ignore_ascii_case(shortcut) {
                return Err(format!("Conflicting presets: `{}` and `{}`", named, shortcut));
            }
        }

        if let Some(name) = self.preset.as_deref() {
            if find_preset(name).is_none() {
                return Err(format!("Unknown preset `{}`, available: {}", name, preset_names()));
            }
        }

        Ok(())
    }

    /// Preset chosen by `--preset` or a shortcut flag
    pub fn selected_preset(&self) -> Option<String> {
        self.preset
            .clone()
            .or_else(|| self.presets.selected().first().map(|name| name.to_string()))
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Presets followed by the environment variables
fn help_footer() -> String {
    format!("{}\n{}", presets_help(), EnvManager::display_env_help())
}

/// Parse a positive millisecond count
fn parse_millis(s: &str) -> Result<u64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid duration: {}", s));
    }

    match s.parse::<u64>() {
        Ok(0) => Err("Duration must be at least 1ms".to_string()),
        Ok(ms) => Ok(ms),
        Err(_) => Err(format!("Invalid duration: {}", s)),
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_positional_forms() {
        let cli = Cli::parse_from(["portping", "example.com", "443"]);
        assert_eq!(cli.args, vec!["example.com", "443"]);
        assert!(cli.validate().is_ok());

        let cli = Cli::parse_from(["portping", "--udp", "10.0.0.1", "53", "abcd"]);
        assert!(cli.udp);
        assert_eq!(cli.args.len(), 3);
    }

    #[test]
    fn test_timing_options() {
        let cli = Cli::parse_from(["portping", "-t", "250", "-d", "500", "-c", "4", "host", "22"]);
        assert_eq!(cli.timeout, Some(250));
        assert_eq!(cli.delay, Some(500));
        assert_eq!(cli.count, Some(4));

        let cli = Cli::parse_from(["portping", "host", "22"]);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.count, None);
    }

    #[test]
    fn test_zero_timeout_rejected_by_parser() {
        assert!(Cli::try_parse_from(["portping", "-t", "0", "host", "22"]).is_err());
        assert!(Cli::try_parse_from(["portping", "-d", "abc", "host", "22"]).is_err());
    }

    #[test]
    fn test_tcp_and_udp_conflict() {
        assert!(Cli::try_parse_from(["portping", "--tcp", "--udp", "host", "22"]).is_err());
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["portping", "--color", "--no-color", "host", "22"]).is_err());
    }

    #[test]
    fn test_family_flags() {
        let cli = Cli::parse_from(["portping", "-4", "-6", "host", "22"]);
        assert!(cli.ipv4);
        assert!(cli.ipv6);
    }

    #[test]
    fn test_preset_shortcuts() {
        let cli = Cli::parse_from(["portping", "--ntp", "pool.ntp.org"]);
        assert_eq!(cli.presets.selected(), vec!["ntp"]);
        assert_eq!(cli.selected_preset().as_deref(), Some("ntp"));
        assert!(cli.validate().is_ok());

        let cli = Cli::parse_from(["portping", "--dns", "--ssh", "host"]);
        assert!(cli.validate().unwrap_err().contains("Multiple presets"));
    }

    #[test]
    fn test_named_preset_conflicts() {
        let cli = Cli::parse_from(["portping", "--preset", "ssh", "--https", "host"]);
        assert!(cli.validate().unwrap_err().contains("Conflicting presets"));

        let cli = Cli::parse_from(["portping", "--preset", "HTTPS", "--https", "host"]);
        assert!(cli.validate().is_ok());

        let cli = Cli::parse_from(["portping", "--preset", "gopher", "host"]);
        assert!(cli.validate().unwrap_err().contains("Unknown preset"));
    }

    #[test]
    fn test_too_many_arguments() {
        let cli = Cli::parse_from(["portping", "a", "1", "ff", "extra"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_use_colors_method() {
        let cli = Cli::parse_from(["portping", "--no-color", "host"]);
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["portping", "--color", "host"]);
        assert!(cli.use_colors());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_millis("1").unwrap(), 1);
        assert_eq!(parse_millis("60000").unwrap(), 60000);
        assert!(parse_millis("0").is_err());
        assert!(parse_millis("+10").is_err());
        assert!(parse_millis("-5").is_err());
        assert!(parse_millis("1.5").is_err());
        assert!(parse_millis("").is_err());
    }

    #[test]
    fn test_help_lists_presets_and_env_vars() {
        let footer = help_footer();
        assert!(footer.starts_with("Presets:"));
        assert!(footer.contains("PORTPING_DELAY_MS"));
    }
}
