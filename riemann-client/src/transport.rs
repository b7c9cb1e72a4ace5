//! Transport abstraction.
//!
//! A [`Connect`] implementation produces a live [`Transport`]; the client only
//! ever talks to these two traits. [`NetConnector`] and [`NetTransport`] are
//! the network-backed implementations selected by [`TransportKind`].

use crate::connection::{ConnectionConfig, TransportKind};
use crate::datagram::DatagramTransport;
use crate::error::{ConnectError, TransportError};
use crate::framed::FramedStream;
use crate::tls::create_tls_connector;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// A live channel to the server.
pub trait Transport: Send {
    /// Sends one serialized message.
    ///
    /// Reliable transports return the serialized response; datagram
    /// transports return `None`.
    fn write(
        &mut self,
        payload: Bytes,
    ) -> impl Future<Output = Result<Option<Bytes>, TransportError>> + Send;

    /// Releases the underlying socket. Never fails.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Produces transports on demand.
pub trait Connect: Send + Sync {
    type Transport: Transport;

    fn connect(&self) -> impl Future<Output = Result<Self::Transport, ConnectError>> + Send;
}

/// A network transport: plain TCP, TLS, or UDP.
#[derive(Debug)]
pub enum NetTransport {
    Plain(FramedStream<TcpStream>),
    Tls(Box<FramedStream<TlsStream<TcpStream>>>),
    Datagram(DatagramTransport),
}

impl NetTransport {
    pub fn kind(&self) -> TransportKind {
        match self {
            NetTransport::Plain(_) => TransportKind::Tcp,
            NetTransport::Tls(_) => TransportKind::Tls,
            NetTransport::Datagram(_) => TransportKind::Udp,
        }
    }
}

impl Transport for NetTransport {
    async fn write(&mut self, payload: Bytes) -> Result<Option<Bytes>, TransportError> {
        match self {
            NetTransport::Plain(stream) => stream.request(payload).await.map(Some),
            NetTransport::Tls(stream) => stream.request(payload).await.map(Some),
            NetTransport::Datagram(socket) => socket.send(&payload).await.map(|_| None),
        }
    }

    async fn close(&mut self) {
        match self {
            NetTransport::Plain(stream) => stream.shutdown().await,
            NetTransport::Tls(stream) => stream.shutdown().await,
            // Dropping the socket is enough
            NetTransport::Datagram(_) => {}
        }
    }
}

/// Opens [`NetTransport`]s according to a [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct NetConnector {
    config: ConnectionConfig,
}

impl NetConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn connect_tcp(&self) -> Result<TcpStream, ConnectError> {
        let tcp_stream = TcpStream::connect((self.config.host.as_str(), self.config.port)).await?;

        // Requests are small and latency-bound
        tcp_stream.set_nodelay(true).ok();
        Ok(tcp_stream)
    }

    async fn connect_tls(&self) -> Result<TlsStream<TcpStream>, ConnectError> {
        let (connector, server_name) = create_tls_connector(&self.config.tls, &self.config.host)?;
        let tcp_stream = self.connect_tcp().await?;

        tracing::debug!("Performing TLS handshake...");
        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| ConnectError::TlsHandshake(e.to_string()))?;
        tracing::debug!("TLS handshake complete");

        Ok(tls_stream)
    }

    async fn resolve(&self) -> Result<SocketAddr, ConnectError> {
        let host = self.config.host.as_str();
        let port = self.config.port;
        let mut addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| ConnectError::Resolve {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            })?;

        addrs.next().ok_or_else(|| ConnectError::Resolve {
            host: host.to_string(),
            port,
            reason: "no addresses returned".to_string(),
        })
    }

    async fn open(&self) -> Result<NetTransport, ConnectError> {
        let max = self.config.max_frame_size;
        let timeout = self.config.request_timeout;

        match self.config.transport {
            TransportKind::Tcp => {
                let stream = self.connect_tcp().await?;
                Ok(NetTransport::Plain(FramedStream::new(stream, max, timeout)))
            }
            TransportKind::Tls => {
                let stream = self.connect_tls().await?;
                Ok(NetTransport::Tls(Box::new(FramedStream::new(
                    stream, max, timeout,
                ))))
            }
            TransportKind::Udp => {
                let peer = self.resolve().await?;
                Ok(NetTransport::Datagram(DatagramTransport::bind(peer).await?))
            }
        }
    }
}

impl Connect for NetConnector {
    type Transport = NetTransport;

    async fn connect(&self) -> Result<NetTransport, ConnectError> {
        tracing::debug!(
            "Connecting to {}:{} over {}...",
            self.config.host,
            self.config.port,
            self.config.transport
        );

        let transport = tokio::time::timeout(self.config.connect_timeout, self.open())
            .await
            .map_err(|_| {
                tracing::debug!("Connection timeout");
                ConnectError::Timeout
            })?
            .map_err(|e| {
                tracing::debug!("Connection failed: {}", e);
                e
            })?;

        tracing::debug!("Connected ({})", transport.kind());
        Ok(transport)
    }
}
