//! Error handling for portping

use thiserror::Error;

/// Run-level error types
///
/// Per-attempt failures never surface here; they travel as
/// [`ProbeError`](crate::probe::ProbeError) inside each probe outcome and are
/// folded into statistics.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Out-of-range values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parsing errors (ports, hex payloads, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// UDP selected without a payload
    #[error("UDP payload is required")]
    PayloadRequired,

    /// Host lookup failed
    #[error("resolve host `{host}`: {cause}")]
    ResolveFailed { host: String, cause: String },

    /// Lookup succeeded but nothing survived the address family filter
    #[error("no addresses found for `{host}`")]
    NoAddressesFound { host: String },

    /// The run was cancelled before it could produce a result
    #[error("Cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn resolve_failed<H: Into<String>, C: Into<String>>(host: H, cause: C) -> Self {
        Self::ResolveFailed {
            host: host.into(),
            cause: cause.into(),
        }
    }

    pub fn no_addresses_found<H: Into<String>>(host: H) -> Self {
        Self::NoAddressesFound { host: host.into() }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Short tag shown in console output and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Parse(_) => "PARSE",
            Self::PayloadRequired => "PAYLOAD",
            Self::ResolveFailed { .. } | Self::NoAddressesFound { .. } => "DNS",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether running the same command again may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ResolveFailed { .. })
    }

    /// Whether this error is a command-line usage problem
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) | Self::PayloadRequired
        )
    }

    /// Longer explanation with a hint, shown in verbose mode
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Ports must be 1-65535 and timeout/delay at least 1ms.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse input: {}\n\nSuggestion: Ports are decimal numbers and payloads are hex strings (e.g. 1b00ff).", msg)
            }
            Self::PayloadRequired => {
                "UDP probing needs a payload to send.\n\nSuggestion: Pass --payload <HEX>, a trailing hex argument, or a UDP preset such as --dns.".to_string()
            }
            Self::ResolveFailed { host, cause } => {
                format!("Could not resolve `{}`: {}\n\nSuggestion: Check the host name and your DNS configuration.", host, cause)
            }
            Self::NoAddressesFound { host } => {
                format!("`{}` has no addresses in the allowed families.\n\nSuggestion: Use -4 and/or -6 to allow the family the host actually has.", host)
            }
            Self::Cancelled => "Run was cancelled.".to_string(),
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report it with the command you ran.", msg)
            }
        }
    }

    /// Process exit status: 2 for usage, 130 for interrupts, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            _ if self.is_usage_error() => 2,
            Self::Cancelled => 130,
            _ => 1,
        }
    }

    /// `[CATEGORY] message`, colored by severity when enabled
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if !use_color {
            return format!("[{}] {}", category, message);
        }

        use colored::{Color, Colorize};
        let color = match self {
            _ if self.is_usage_error() => Color::Red,
            Self::ResolveFailed { .. } | Self::NoAddressesFound { .. } => Color::Yellow,
            Self::Cancelled => Color::Blue,
            _ => Color::BrightRed,
        };
        format!("[{}] {}", category.color(color).bold(), message.color(color))
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(error: hex::FromHexError) -> Self {
        Self::parse(format!("invalid hex payload: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Prints run-level errors to stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Everything `report_error` prints, as one string
    pub fn render(&self, error: &AppError) -> String {
        let mut text = error.format_for_console(self.use_color);
        if !self.verbose {
            return text;
        }

        text.push_str("\n\n");
        text.push_str(&error.user_friendly_message());

        if error.is_recoverable() {
            let hint = "This error might be temporary. You can try running the command again.";
            text.push_str("\n\n");
            if self.use_color {
                use colored::Colorize;
                text.push_str(&hint.green().to_string());
            } else {
                text.push_str(hint);
            }
        }
        text
    }

    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}
