//! Length-prefixed request/response exchange over a byte stream.
//!
//! Shared by the plain TCP and TLS transports.

use crate::error::TransportError;
use bytes::Bytes;
use riemann_protocol::{Frame, FRAME_HEADER_SIZE};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A byte stream carrying length-prefixed frames.
#[derive(Debug)]
pub struct FramedStream<S> {
    stream: S,
    max_frame_size: u32,
    request_timeout: Duration,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, max_frame_size: u32, request_timeout: Duration) -> Self {
        Self {
            stream,
            max_frame_size,
            request_timeout,
        }
    }

    /// Sends one frame and waits for the response frame.
    pub async fn request(&mut self, payload: Bytes) -> Result<Bytes, TransportError> {
        let timeout = self.request_timeout;
        tokio::time::timeout(timeout, async {
            self.write_frame(payload).await?;
            self.read_frame().await
        })
        .await
        .map_err(|_| {
            tracing::debug!("Request timed out after {:?}", timeout);
            TransportError::Timeout
        })?
    }

    /// Writes prefix and payload with a single buffered write.
    pub async fn write_frame(&mut self, payload: Bytes) -> Result<(), TransportError> {
        let encoded = Frame::new(payload).encode()?;
        tracing::debug!("Writing frame ({} bytes)", encoded.len());

        self.stream.write_all(&encoded).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads exactly one frame.
    pub async fn read_frame(&mut self) -> Result<Bytes, TransportError> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        let received = read_full(&mut self.stream, &mut header).await?;
        if received == 0 {
            tracing::debug!("Connection closed before response");
            return Err(TransportError::ConnectionClosed);
        }
        if received < FRAME_HEADER_SIZE {
            return Err(TransportError::ShortRead {
                expected: FRAME_HEADER_SIZE,
                received,
            });
        }

        let len = Frame::payload_len(header, self.max_frame_size)?;
        tracing::debug!("Reading frame payload ({} bytes)", len);

        let mut payload = vec![0u8; len];
        let received = read_full(&mut self.stream, &mut payload).await?;
        if received < len {
            return Err(TransportError::ShortRead {
                expected: len,
                received,
            });
        }

        Ok(Bytes::from(payload))
    }

    /// Shuts the stream down. Errors are ignored.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!("Ignoring error on shutdown: {}", e);
        }
    }
}

/// Fills `buf` until it is full or the peer closes. Returns the byte count.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
