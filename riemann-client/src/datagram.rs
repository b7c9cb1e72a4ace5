//! Fire-and-forget UDP transport.

use crate::error::TransportError;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

/// An unconnected UDP socket bound to an ephemeral local port.
///
/// Each message is one datagram with no framing. Nothing is read back, so
/// delivery is never confirmed.
#[derive(Debug)]
pub struct DatagramTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl DatagramTransport {
    /// Creates the local socket. No packets are exchanged.
    pub async fn bind(peer: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = if peer.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(local).await?;
        tracing::debug!("UDP socket bound to {}", socket.local_addr()?);
        Ok(Self { socket, peer })
    }

    /// Sends `payload` as one datagram.
    pub async fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let sent = self.socket.send_to(payload, self.peer).await?;
        if sent < payload.len() {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: sent {} of {} bytes", sent, payload.len()),
            )));
        }
        tracing::debug!("Sent datagram ({} bytes) to {}", sent, self.peer);
        Ok(())
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_bare_payload() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = DatagramTransport::bind(server.local_addr().unwrap())
            .await
            .unwrap();

        transport.send(b"event bytes").await.unwrap();

        let mut buf = [0u8; 64];
        let (n, from) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"event bytes");
        assert_eq!(from.port(), transport.local_addr().unwrap().port());
    }

    #[tokio::test]
    async fn test_oversized_datagram_fails() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = DatagramTransport::bind(server.local_addr().unwrap())
            .await
            .unwrap();

        // Larger than the maximum UDP payload
        let payload = vec![0u8; 70_000];
        assert!(transport.send(&payload).await.is_err());
    }
}
