//! Built-in service presets

use crate::types::Protocol;

/// A named port/protocol/payload combination for a well-known service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub protocol: Protocol,
    pub port: u16,
    /// Hex payload sent on each UDP probe
    pub payload_hex: Option<&'static str>,
    pub description: &'static str,
}

/// Standard query for `www.google.com` A record
const DNS_QUERY: &str = "0000010000000000000100000377777706676f6f676c6503636f6d0000010001";

/// Client mode request, version 3, followed by a zeroed 48 byte header
const NTP_REQUEST: &str = concat!(
    "1b",
    "0000000000000000000000000000000000000000000000",
    "000000000000000000000000000000000000000000000000"
);

/// Binding request with the magic cookie
const STUN_BINDING: &str = "000100002112a442636363636363636363636363";

pub const PRESETS: &[Preset] = &[
    Preset { name: "dns", protocol: Protocol::Udp, port: 53, payload_hex: Some(DNS_QUERY), description: "DNS query over UDP" },
    Preset { name: "ntp", protocol: Protocol::Udp, port: 123, payload_hex: Some(NTP_REQUEST), description: "NTP client request" },
    Preset { name: "stun", protocol: Protocol::Udp, port: 3478, payload_hex: Some(STUN_BINDING), description: "STUN binding request" },
    Preset { name: "ftp", protocol: Protocol::Tcp, port: 21, payload_hex: None, description: "FTP control" },
    Preset { name: "ssh", protocol: Protocol::Tcp, port: 22, payload_hex: None, description: "SSH" },
    Preset { name: "smtp", protocol: Protocol::Tcp, port: 25, payload_hex: None, description: "SMTP" },
    Preset { name: "http", protocol: Protocol::Tcp, port: 80, payload_hex: None, description: "HTTP" },
    Preset { name: "pop3", protocol: Protocol::Tcp, port: 110, payload_hex: None, description: "POP3" },
    Preset { name: "imap", protocol: Protocol::Tcp, port: 143, payload_hex: None, description: "IMAP" },
    Preset { name: "https", protocol: Protocol::Tcp, port: 443, payload_hex: None, description: "HTTPS" },
    Preset { name: "mysql", protocol: Protocol::Tcp, port: 3306, payload_hex: None, description: "MySQL" },
    Preset { name: "postgres", protocol: Protocol::Tcp, port: 5432, payload_hex: None, description: "PostgreSQL" },
];

/// Look up a preset by case-insensitive name
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Preset names joined for help and error text
pub fn preset_names() -> String {
    PRESETS.iter().map(|preset| preset.name).collect::<Vec<_>>().join(", ")
}

/// One line per preset for `--help`
pub fn presets_help() -> String {
    let mut lines = vec!["Presets:".to_string()];
    for preset in PRESETS {
        lines.push(format!(
            "  {:<9} {} {:<5} {}",
            preset.name, preset.protocol, preset.port, preset.description
        ));
    }
    lines.join("\n")
}
