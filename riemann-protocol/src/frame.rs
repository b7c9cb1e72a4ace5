//! Length-prefixed framing for stream transports.
//!
//! Frame layout:
//!
//! ```text
//! +-------------+----------------------+
//! | payload_len | payload              |
//! | 4 bytes BE  | payload_len bytes    |
//! +-------------+----------------------+
//! ```
//!
//! Requests and responses use the same layout. Datagram transports send the
//! bare payload.

use crate::error::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length prefix in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// A single framed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
}

impl Frame {
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Encodes prefix and payload into one contiguous buffer.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let len = self.payload.len();
        if len > u32::MAX as usize {
            return Err(ProtocolError::FrameTooLarge {
                size: len as u64,
                max: u32::MAX as u64,
            });
        }

        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + len);
        buf.put_u32(len as u32);
        buf.put_slice(&self.payload);
        Ok(buf)
    }

    /// Reads the payload length out of a length prefix, rejecting anything
    /// above `max_size`.
    pub fn payload_len(
        header: [u8; FRAME_HEADER_SIZE],
        max_size: u32,
    ) -> Result<usize, ProtocolError> {
        let len = u32::from_be_bytes(header);
        if len > max_size {
            return Err(ProtocolError::FrameTooLarge {
                size: len as u64,
                max: max_size as u64,
            });
        }
        Ok(len as usize)
    }

    /// Decodes a frame from the front of `buf`.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded,
    /// `Ok(None)` if more data is needed, or `Err` if the prefix exceeds
    /// `max_size`. Nothing is consumed unless a whole frame is available.
    pub fn decode(buf: &mut BytesMut, max_size: u32) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let header = [buf[0], buf[1], buf[2], buf[3]];
        let len = Self::payload_len(header, max_size)?;

        if buf.len() < FRAME_HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(len).freeze();
        Ok(Some(Self { payload }))
    }
}
