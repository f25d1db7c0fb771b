//! Core formatting traits and the plain text implementation
//!
//! Layout lives in the `render_*` functions; formatters only decide how a
//! cell is painted. Cells are padded before painting so escape codes never
//! disturb column alignment.

use crate::{
    error::{AppError, Result},
    models::{AttemptReport, Banner, RunSummary},
};
use std::fmt::Write as _;
use std::time::Duration;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Run header: host, protocol, port and the resolved addresses
    fn format_banner(&self, banner: &Banner) -> Result<String>;

    /// One per-attempt line, without trailing newline
    fn format_attempt(&self, report: &AttemptReport) -> Result<String>;

    /// Final statistics block
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Append run totals to the summary
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// Role of a piece of text, mapped to a color by colored formatters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    /// Host, protocol, port and addresses
    Highlight,
    /// Successful latency
    Success,
    /// Failed latency
    Failure,
    /// Failure cause
    ErrorText,
    Heading,
    HeadingSuccess,
    HeadingFailure,
}

pub(crate) trait Paint {
    fn paint(&self, text: &str, tone: Tone) -> String;
}

/// Milliseconds with two decimals, e.g. `12.34ms`
pub fn format_duration(duration: Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

fn format_optional_duration(duration: Option<Duration>) -> String {
    duration.map(format_duration).unwrap_or_else(|| "-".to_string())
}

fn fmt_err(what: &str) -> impl Fn(std::fmt::Error) -> AppError + '_ {
    move |e| AppError::internal(format!("Failed to format {}: {}", what, e))
}

pub(crate) fn render_banner(painter: &dyn Paint, banner: &Banner) -> Result<String> {
    let mut output = String::new();
    let suffix = if banner.addresses.len() == 1 { "IP" } else { "IPs" };

    write!(
        output,
        "Ping of {} on {} {} ({} {})",
        painter.paint(&banner.host, Tone::Highlight),
        painter.paint(banner.protocol.as_str(), Tone::Highlight),
        painter.paint(&banner.port.to_string(), Tone::Highlight),
        banner.addresses.len(),
        suffix
    )
    .map_err(fmt_err("banner"))?;

    for address in &banner.addresses {
        write!(
            output,
            "\n{}: {}",
            address.family().label(),
            painter.paint(&address.value, Tone::Highlight)
        )
        .map_err(fmt_err("banner"))?;
    }

    if let Some(payload) = &banner.payload_hex {
        write!(output, "\nPayload (hex): {}", painter.paint(payload, Tone::Highlight))
            .map_err(fmt_err("banner"))?;
    }

    Ok(output)
}

pub(crate) fn render_attempt(painter: &dyn Paint, report: &AttemptReport) -> Result<String> {
    let mut output = String::new();
    let duration = format!("{:>10}", format_duration(report.duration));
    let duration_tone = if report.error.is_some() { Tone::Failure } else { Tone::Success };

    write!(
        output,
        "{:>3}\t{:>width$}\t{}",
        report.label(),
        report.address,
        painter.paint(&duration, duration_tone),
        width = report.address_width
    )
    .map_err(fmt_err("attempt"))?;

    if let Some(error) = &report.error {
        write!(output, "\tErr: {}", painter.paint(&error.to_string(), Tone::ErrorText))
            .map_err(fmt_err("attempt"))?;
    }

    Ok(output)
}

pub(crate) fn render_summary(painter: &dyn Paint, summary: &RunSummary, verbose: bool) -> Result<String> {
    let mut output = String::new();
    let longest_row = summary.rows.iter().map(|row| row.address.len()).max().unwrap_or(0);
    let width = summary.address_width.max(longest_row) + 1;

    write!(
        output,
        "\nStatistics of ping {} on {} {}\n",
        painter.paint(&summary.host, Tone::Highlight),
        painter.paint(summary.protocol.as_str(), Tone::Highlight),
        painter.paint(&summary.port.to_string(), Tone::Highlight)
    )
    .map_err(fmt_err("summary"))?;

    write!(
        output,
        "{}{:>12}{} {}{:>10} {:>10}  {:>10}",
        painter.paint(&format!("{:>width$}", "IP Address", width = width), Tone::Heading),
        "Attempted",
        painter.paint(&format!("{:>11}", "Connected"), Tone::HeadingSuccess),
        painter.paint(&format!("{:>15}", "Failed"), Tone::HeadingFailure),
        "Minimum",
        "Maximum",
        "Average"
    )
    .map_err(fmt_err("summary"))?;

    for row in &summary.rows {
        let failed = format!("{} {:>6}", row.failures, format!("({:.2}%)", row.failure_rate));
        write!(
            output,
            "\n{}{:>12}{} {}{:>10} {:>10}  {:>10}",
            painter.paint(&format!("{:>width$}", row.address, width = width), Tone::Highlight),
            row.attempts,
            painter.paint(&format!("{:>11}", row.successes), Tone::Success),
            painter.paint(&format!("{:>15}", failed), Tone::Failure),
            format_optional_duration(row.minimum),
            format_optional_duration(row.maximum),
            format_optional_duration(row.average)
        )
        .map_err(fmt_err("summary"))?;
    }

    if verbose {
        write!(
            output,
            "\n\n{} rounds, {} attempts, {} failed in {:.2}s",
            summary.rounds_completed,
            summary.total_attempts(),
            summary.total_failures(),
            summary.elapsed.as_secs_f64()
        )
        .map_err(fmt_err("summary"))?;
    }

    Ok(output)
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl Paint for PlainFormatter {
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_banner(&self, banner: &Banner) -> Result<String> {
        render_banner(self, banner)
    }

    fn format_attempt(&self, report: &AttemptReport) -> Result<String> {
        render_attempt(self, report)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        render_summary(self, summary, self.options.verbose_mode)
    }
}
