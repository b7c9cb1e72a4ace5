//! Connection configuration.

use riemann_protocol::{DEFAULT_HOST, DEFAULT_MAX_FRAME_SIZE, DEFAULT_PORT, DEFAULT_TLS_PORT};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default connect timeout (covers TCP connect and TLS handshake).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default timeout for one request/response exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport variant used to reach the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Length-prefixed frames over plain TCP.
    #[default]
    Tcp,
    /// Length-prefixed frames over TLS.
    Tls,
    /// Bare datagrams over UDP. No response is read.
    Udp,
}

impl TransportKind {
    /// Port the server listens on for this transport by default.
    pub fn default_port(&self) -> u16 {
        match self {
            TransportKind::Tcp | TransportKind::Udp => DEFAULT_PORT,
            TransportKind::Tls => DEFAULT_TLS_PORT,
        }
    }

    /// Returns whether the server replies to each message.
    pub fn is_reliable(&self) -> bool {
        !matches!(self, TransportKind::Udp)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Tcp => write!(f, "tcp"),
            TransportKind::Tls => write!(f, "tls"),
            TransportKind::Udp => write!(f, "udp"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(TransportKind::Tcp),
            "tls" | "ssl" => Ok(TransportKind::Tls),
            "udp" => Ok(TransportKind::Udp),
            other => Err(format!("unknown transport: {}", other)),
        }
    }
}

/// TLS configuration for client connections.
///
/// The server certificate is always verified.
#[derive(Debug, Clone, Default)]
pub struct TlsClientConfig {
    /// Path to PEM-encoded CA certificate(s) for server verification.
    /// If None, the webpki root set is used.
    pub ca_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client certificate (for mTLS).
    pub client_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client private key (for mTLS).
    pub client_key_path: Option<PathBuf>,
    /// Server name for SNI and verification (defaults to the configured host).
    pub server_name: Option<String>,
}

impl TlsClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn with_client_cert(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.client_cert_path = Some(cert_path.into());
        self.client_key_path = Some(key_path.into());
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Transport variant.
    pub transport: TransportKind,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout (write plus response read).
    pub request_timeout: Duration,
    /// Largest response frame accepted, in bytes.
    pub max_frame_size: u32,
    /// TLS settings, used when `transport` is [`TransportKind::Tls`].
    pub tls: TlsClientConfig,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            transport: TransportKind::Tcp,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            tls: TlsClientConfig::default(),
        }
    }

    /// Plain TCP to `host:port`.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(host, port)
    }

    /// UDP datagrams to `host:port`.
    pub fn udp(host: impl Into<String>, port: u16) -> Self {
        Self::new(host, port).with_transport(TransportKind::Udp)
    }

    /// TLS to `host:port`.
    pub fn tls(host: impl Into<String>, port: u16, tls: TlsClientConfig) -> Self {
        Self::new(host, port).with_tls(tls)
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Sets TLS options and switches the transport to TLS.
    pub fn with_tls(mut self, tls_config: TlsClientConfig) -> Self {
        self.tls = tls_config;
        self.transport = TransportKind::Tls;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
