//! Single-attempt network probes
//!
//! A [`Prober`] performs exactly one timed attempt against one socket
//! address and always returns a [`ProbeOutcome`]; failures are values, not
//! errors. The timeout and the run-level cancellation both bound every
//! suspension point, whichever fires first.

pub mod tcp;
pub mod udp;

pub use tcp::TcpProber;
pub use udp::UdpProber;

use crate::models::{ProbeConfig, ProbeOutcome};
use crate::types::{AppError, Protocol, Result};
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a single attempt failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Connection Timeout")]
    Timeout,

    #[error("Connection refused")]
    Refused,

    #[error("Cancelled")]
    Cancelled,

    #[error("UDP payload required")]
    PayloadRequired,

    #[error("{0}")]
    Io(String),
}

impl ProbeError {
    /// Map a socket error onto the failure kinds reported to the user
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ProbeError::Timeout,
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => ProbeError::Refused,
            _ => ProbeError::Io(error.to_string()),
        }
    }
}

/// Per-attempt scope: a timeout plus a child of the run cancellation token
#[derive(Debug, Clone)]
pub struct ProbeContext {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl ProbeContext {
    pub fn new(timeout: Duration, parent: &CancellationToken) -> Self {
        Self {
            timeout,
            cancel: parent.child_token(),
        }
    }

    /// Context that can only end by timeout
    pub fn detached(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Await `operation` until it finishes, the timeout expires or the
    /// scope is cancelled.
    pub async fn bound<F, T>(&self, operation: F) -> std::result::Result<T, ProbeError>
    where
        F: Future<Output = io::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProbeError::Cancelled),
            result = tokio::time::timeout(self.timeout, operation) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(ProbeError::from_io(&e)),
                Err(_) => Err(ProbeError::Timeout),
            },
        }
    }
}

/// One timed attempt against one address
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target`; the returned duration is measured even on failure
    async fn probe(&self, target: SocketAddr, ctx: &ProbeContext) -> ProbeOutcome;

    fn protocol(&self) -> Protocol;
}

/// Pick the prober for a validated configuration
pub fn create_prober(config: &ProbeConfig) -> Result<Box<dyn Prober>> {
    match config.protocol {
        Protocol::Tcp => Ok(Box::new(TcpProber::new())),
        Protocol::Udp => {
            if config.payload.is_empty() {
                return Err(AppError::PayloadRequired);
            }
            Ok(Box::new(UdpProber::new(config.payload.clone())))
        }
    }
}
