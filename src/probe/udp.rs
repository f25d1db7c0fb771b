//! UDP send-and-await timing

use super::{ProbeContext, ProbeError, Prober};
use crate::models::ProbeOutcome;
use crate::types::Protocol;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// Sends the payload in one datagram and waits for any reply byte
///
/// The reply content is never inspected; a zero-length datagram counts too.
#[derive(Debug, Clone)]
pub struct UdpProber {
    payload: Vec<u8>,
}

impl UdpProber {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn exchange(&self, target: SocketAddr, ctx: &ProbeContext) -> Result<(), ProbeError> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = ctx
            .bound(async {
                let socket = UdpSocket::bind(local).await?;
                socket.connect(target).await?;
                Ok(socket)
            })
            .await?;

        // Write and read each get the full timeout
        ctx.bound(socket.send(&self.payload)).await?;

        let mut reply = [0u8; 1];
        ctx.bound(socket.recv(&mut reply)).await?;
        Ok(())
    }
}

#[async_trait]
impl Prober for UdpProber {
    async fn probe(&self, target: SocketAddr, ctx: &ProbeContext) -> ProbeOutcome {
        if self.payload.is_empty() {
            return ProbeOutcome::failure(Duration::ZERO, ProbeError::PayloadRequired);
        }

        let start = Instant::now();
        let result = self.exchange(target, ctx).await;
        let duration = start.elapsed();

        match result {
            Ok(()) => ProbeOutcome::success(duration),
            Err(error) => ProbeOutcome::failure(duration, error),
        }
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }
}
