//! Output formatting and display system
//!
//! The probe loop hands banner, per-attempt and summary values to a
//! [`Reporter`]; the console reporter renders them through an
//! [`OutputFormatter`] onto stdout.

mod formatter;
mod colored;

pub use formatter::{
    format_duration,
    OutputFormatter,
    PlainFormatter,
    FormattingOptions,
    Tone,
};
pub use colored::{
    ColoredFormatter,
    ColorScheme,
};

use crate::{
    error::Result,
    models::{AttemptReport, Banner, RunSummary},
};
use std::io::{self, Write};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Receiver of everything a run displays
pub trait Reporter: Send {
    fn banner(&mut self, banner: &Banner);

    fn attempt(&mut self, report: &AttemptReport);

    fn summary(&mut self, summary: &RunSummary);
}

/// Reporter that renders onto a writer, stdout by default
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    formatter: Box<dyn OutputFormatter>,
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(formatter: Box<dyn OutputFormatter>) -> Self {
        Self::new(formatter, io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(formatter: Box<dyn OutputFormatter>, out: W) -> Self {
        Self { formatter, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, rendered: Result<String>) {
        // Display failures never stop the probe loop
        let written = match rendered {
            Ok(text) => writeln!(self.out, "{}", text).and_then(|_| self.out.flush()),
            Err(e) => {
                eprintln!("{}", e.format_for_console(false));
                Ok(())
            }
        };
        if let Err(e) = written {
            eprintln!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn banner(&mut self, banner: &Banner) {
        let rendered = self.formatter.format_banner(banner);
        self.emit(rendered);
    }

    fn attempt(&mut self, report: &AttemptReport) {
        let rendered = self.formatter.format_attempt(report);
        self.emit(rendered);
    }

    fn summary(&mut self, summary: &RunSummary) {
        let rendered = self.formatter.format_summary(summary);
        self.emit(rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use crate::types::{Protocol, RunState};
    use std::time::Duration;

    #[test]
    fn test_factory_plain_formatter_has_no_escapes() {
        let formatter = OutputFormatterFactory::create_plain_formatter();
        let line = formatter
            .format_attempt(&AttemptReport {
                round: 1,
                sub_index: None,
                address: "127.0.0.1".to_string(),
                address_width: 9,
                duration: Duration::from_millis(2),
                error: Some(crate::probe::ProbeError::Timeout),
            })
            .unwrap();
        assert!(!line.contains('\x1b'));
        assert!(line.ends_with("\tErr: Connection Timeout"));
    }

    #[test]
    fn test_console_reporter_writes_lines() {
        let mut reporter = ConsoleReporter::new(OutputFormatterFactory::create_plain_formatter(), Vec::new());

        reporter.banner(&Banner {
            host: "127.0.0.1".to_string(),
            protocol: Protocol::Tcp,
            port: 8080,
            addresses: vec![Address::new("127.0.0.1".parse().unwrap())],
            payload_hex: None,
        });
        reporter.attempt(&AttemptReport {
            round: 1,
            sub_index: None,
            address: "127.0.0.1".to_string(),
            address_width: 9,
            duration: Duration::from_millis(1),
            error: None,
        });
        reporter.summary(&RunSummary {
            host: "127.0.0.1".to_string(),
            protocol: Protocol::Tcp,
            port: 8080,
            state: RunState::Completed,
            rounds_completed: 1,
            rows: Vec::new(),
            address_width: 9,
            elapsed: Duration::from_millis(1),
        });

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Ping of 127.0.0.1 on tcp 8080 (1 IP)");
        assert_eq!(lines[1], "IPv4: 127.0.0.1");
        assert_eq!(lines[2], "  1\t127.0.0.1\t    1.00ms");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Statistics of ping 127.0.0.1 on tcp 8080");
    }
}
