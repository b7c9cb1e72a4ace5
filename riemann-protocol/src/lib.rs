//! # riemann-protocol
//!
//! Wire protocol for the Riemann event client.
//!
//! This crate provides:
//! - The protobuf schema (`Msg`, `Event`, `Query`, `Attribute`)
//! - Typed `Event` and `Message` wrappers over the schema
//! - Length-prefixed binary framing for stream transports
//! - Protocol error types and constants

pub mod error;
pub mod event;
pub mod frame;
pub mod message;
pub mod proto;

pub use error::ProtocolError;
pub use event::Event;
pub use frame::{Frame, FRAME_HEADER_SIZE};
pub use message::Message;

/// Default port for plaintext TCP and UDP.
pub const DEFAULT_PORT: u16 = 5555;

/// Default port for TLS.
pub const DEFAULT_TLS_PORT: u16 = 5554;

/// Default host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default maximum frame payload size accepted by readers (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;
