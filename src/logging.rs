//! Structured logging for portping
//!
//! Log entries go to stderr so they never interleave with the probe lines
//! and summary written to stdout. Every entry carries the run's session id
//! and any context fields set on the shared logger.

use crate::error::AppError;
use crate::models::{Address, Config, ProbeOutcome, RunSummary};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Per-round bookkeeping
    Trace = 0,
    /// Resolution results and individual probes
    Debug = 1,
    /// Run completion
    Info = 2,
    /// Quiet threshold used when neither --verbose nor --debug is set
    Warn = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::White,
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that produced the entry
    pub logger: String,
    /// Session id of the run, filled in when the entry is written
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// `timestamp LEVEL [component] message [session] {fields}`
    Console,
    /// One JSON object per line
    Json,
}

/// State shared by a logger and every logger derived from it with `named`
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Logger that stays silent below warnings
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Warn,
            use_color: false,
            format: LogFormat::Console,
            name: name.to_string(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Level and format follow `--debug` / `--verbose`
    ///
    /// Debug runs log JSON so the entries can be piped into other tools.
    pub fn with_config(name: &str, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(name)
        }
    }

    /// Same settings and shared context under another component name
    pub fn named(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag all following entries with a fresh session id and return it
    pub async fn start_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.context.write().await.session_id = Some(session_id.clone());
        session_id
    }

    /// Attach a field to every following entry
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key.to_string(), json_value);
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Merge the shared context into `entry`
    async fn enrich(&self, entry: &mut LogEntry) {
        let context = self.context.read().await;
        if entry.correlation_id.is_none() {
            entry.correlation_id = context.session_id.clone();
        }
        for (key, value) in &context.context_fields {
            entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }
        self.enrich(&mut entry).await;
        let _ = writeln!(io::stderr(), "{}", self.format_entry(&entry));
    }

    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => serde_json::to_string(entry)
                .unwrap_or_else(|e| format!("{{\"serialize_error\":\"{}\"}}", e)),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            level.as_str().color(entry.level.color()).to_string()
        } else {
            level
        };

        let mut output = format!(
            "{} {} [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            entry.logger,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            output.push_str(&format!(" [{}]", id.get(..8).unwrap_or(id)));
        }

        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }
}

/// Fluent builder returned by the level methods on [`Logger`]
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Duration, success flag and failure cause of one attempt
    pub fn outcome(self, outcome: &ProbeOutcome) -> Self {
        let builder = self
            .field("duration_ms", outcome.duration.as_secs_f64() * 1000.0)
            .field("success", outcome.is_success());
        match &outcome.error {
            Some(error) => builder.field("error", error.to_string()),
            None => builder,
        }
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for the resolution and probe lifecycle
#[derive(Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn from_logger(logger: &Logger) -> Self {
        Self {
            logger: logger.named("PROBE"),
        }
    }

    pub async fn log_resolved(&self, host: &str, addresses: &[Address]) {
        let values: Vec<&str> = addresses.iter().map(|a| a.value.as_str()).collect();
        self.logger.debug(&format!("Resolved {} to {} address(es)", host, addresses.len()))
            .field("host", host)
            .field("addresses", values)
            .log()
            .await;
    }

    pub async fn log_resolution_failed(&self, host: &str, error: &AppError) {
        self.logger.debug(&format!("Resolution of {} failed: {}", host, error))
            .field("host", host)
            .error_info(error)
            .log()
            .await;
    }

    pub async fn log_round_start(&self, round: u64, address_count: usize) {
        self.logger.trace(&format!("Starting round {}", round))
            .field("round", round)
            .field("addresses", address_count)
            .log()
            .await;
    }

    pub async fn log_probe(&self, round: u64, target: SocketAddr, outcome: &ProbeOutcome) {
        let message = match &outcome.error {
            None => format!("Probe {} to {} succeeded", round, target),
            Some(error) => format!("Probe {} to {} failed: {}", round, target, error),
        };
        self.logger.debug(&message)
            .field("round", round)
            .field("target", target.to_string())
            .outcome(outcome)
            .log()
            .await;
    }

    pub async fn log_run_complete(&self, summary: &RunSummary) {
        self.logger.info(&format!(
            "Run {:?} after {} round(s), {} attempt(s), {} failed",
            summary.state,
            summary.rounds_completed,
            summary.total_attempts(),
            summary.total_failures()
        ))
            .field("state", summary.state)
            .field("rounds", summary.rounds_completed)
            .field("elapsed_ms", summary.elapsed.as_secs_f64() * 1000.0)
            .log()
            .await;
    }
}
