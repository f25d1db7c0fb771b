//! TCP connect timing

use super::{ProbeContext, Prober};
use crate::models::ProbeOutcome;
use crate::types::Protocol;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Times a bare connect and closes the connection straight away
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: SocketAddr, ctx: &ProbeContext) -> ProbeOutcome {
        let start = Instant::now();
        let result = ctx.bound(TcpStream::connect(target)).await;
        let duration = start.elapsed();

        match result {
            Ok(stream) => {
                drop(stream);
                ProbeOutcome::success(duration)
            }
            Err(error) => ProbeOutcome::failure(duration, error),
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_connect_to_listener_succeeds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let ctx = ProbeContext::detached(Duration::from_secs(2));
        let outcome = TcpProber::new().probe(target, &ctx).await;
        assert!(outcome.is_success(), "unexpected failure: {:?}", outcome.error);
        assert!(outcome.duration < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_closed_port_fails_with_duration() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap();
        drop(listener);

        let ctx = ProbeContext::detached(Duration::from_millis(500));
        let outcome = TcpProber::new().probe(target, &ctx).await;
        assert!(!outcome.is_success());
        assert!(outcome.duration <= Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_cancelled_before_connect() {
        let parent = CancellationToken::new();
        parent.cancel();
        let ctx = ProbeContext::new(Duration::from_secs(5), &parent);

        let outcome = TcpProber::new().probe("127.0.0.1:9".parse().unwrap(), &ctx).await;
        assert_eq!(outcome.error, Some(ProbeError::Cancelled));
    }
}
