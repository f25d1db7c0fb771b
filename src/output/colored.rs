//! Colored formatter implementation with terminal color support

use crate::{
    error::Result,
    models::{AttemptReport, Banner, RunSummary},
};
use super::formatter::{
    render_attempt, render_banner, render_summary, FormattingOptions, OutputFormatter, Paint, Tone,
};
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub highlight: Color,
    pub success: Color,
    pub failure: Color,
    pub error: Color,
    pub heading: Color,
    pub heading_success: Color,
    pub heading_failure: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            highlight: Color::BrightYellow,
            success: Color::BrightGreen,
            failure: Color::BrightRed,
            error: Color::Red,
            heading: Color::Yellow,
            heading_success: Color::Green,
            heading_failure: Color::Red,
        }
    }
}

impl ColorScheme {
    fn color_for(&self, tone: Tone) -> Option<Color> {
        match tone {
            Tone::Plain => None,
            Tone::Highlight => Some(self.highlight),
            Tone::Success => Some(self.success),
            Tone::Failure => Some(self.failure),
            Tone::ErrorText => Some(self.error),
            Tone::Heading => Some(self.heading),
            Tone::HeadingSuccess => Some(self.heading_success),
            Tone::HeadingFailure => Some(self.heading_failure),
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }
}

impl Paint for ColoredFormatter {
    fn paint(&self, text: &str, tone: Tone) -> String {
        match self.color_scheme.color_for(tone) {
            Some(color) => self.colorize(text, color).to_string(),
            None => text.to_string(),
        }
    }
}

impl OutputFormatter for ColoredFormatter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use crate::probe::ProbeError;
    use crate::types::Protocol;
    use std::time::Duration;

    fn report(error: Option<ProbeError>) -> AttemptReport {
        AttemptReport {
            round: 1,
            sub_index: None,
            address: "127.0.0.1".to_string(),
            address_width: 9,
            duration: Duration::from_millis(2),
            error,
        }
    }

    #[test]
    fn test_colored_attempt_has_escape_codes() {
        colored::control::set_override(true);
        let formatter = ColoredFormatter::new(FormattingOptions::default());
        let line = formatter.format_attempt(&report(Some(ProbeError::Timeout))).unwrap();
        colored::control::unset_override();

        assert!(line.contains("\u{1b}["));
        assert!(line.contains("Connection Timeout"));
        assert!(line.contains("2.00ms"));
    }

    #[test]
    fn test_disabled_colors_match_plain_layout() {
        let options = FormattingOptions {
            enable_color: false,
            verbose_mode: false,
        };
        let colored = ColoredFormatter::new(options.clone());
        let plain = super::super::formatter::PlainFormatter::new(options);

        let banner = Banner {
            host: "localhost".to_string(),
            protocol: Protocol::Tcp,
            port: 80,
            addresses: vec![Address::new("127.0.0.1".parse().unwrap())],
            payload_hex: None,
        };
        assert_eq!(colored.format_banner(&banner).unwrap(), plain.format_banner(&banner).unwrap());
        assert_eq!(
            colored.format_attempt(&report(None)).unwrap(),
            plain.format_attempt(&report(None)).unwrap()
        );
    }

    #[test]
    fn test_plain_tone_is_untouched() {
        let formatter = ColoredFormatter::new(FormattingOptions::default());
        assert_eq!(formatter.paint("Attempted", Tone::Plain), "Attempted");
    }
}
