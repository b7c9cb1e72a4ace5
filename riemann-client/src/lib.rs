//! # riemann-client
//!
//! Client library for Riemann.
//!
//! This crate provides:
//! - Plain TCP, TLS and UDP transports behind one [`Transport`] trait
//! - Length-prefixed request/response framing for the stream transports
//! - A [`Client`] that connects lazily and backs off with randomized
//!   exponential delays when the server is unreachable
//!
//! ```no_run
//! use riemann_client::{Client, ConnectionConfig};
//! use riemann_protocol::Event;
//!
//! # async fn run() -> Result<(), riemann_protocol::ProtocolError> {
//! let mut client = Client::new(ConnectionConfig::tcp("127.0.0.1", 5555));
//!
//! let mut event = Event::new();
//! event.set_service("api latency");
//! event.set_metric(12.5);
//! let acked = client.send(event).await?;
//!
//! let critical = client.query("state = \"critical\"").await?;
//! # let _ = (acked, critical);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod client;
pub mod connection;
pub mod datagram;
pub mod error;
pub mod framed;
pub mod tls;
pub mod transport;

pub use backoff::{Backoff, Clock, ManualClock, SystemClock, MAX_BACKOFF_EXPONENT};
pub use client::Client;
pub use connection::{ConnectionConfig, TlsClientConfig, TransportKind};
pub use error::{ConnectError, TransportError};
pub use transport::{Connect, NetConnector, NetTransport, Transport};
