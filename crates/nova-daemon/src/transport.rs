//! Length-prefixed bincode framing over any `AsyncRead + AsyncWrite`.
//!
//! Every frame is a 4-byte little-endian length prefix followed by that many
//! bytes of bincode-encoded payload. The core never owns a listening socket;
//! callers hand it an already-accepted stream (or, in tests, one half of
//! `tokio::io::duplex`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransportError;

/// Frames larger than this are rejected outright rather than read into
/// memory, bounding how much a single malformed client can make the daemon
/// allocate.
pub const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// A framed request/response channel over a single duplex byte stream.
pub struct Framed<S> {
    inner: S,
}

impl<S> Framed<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Read and decode one frame. Returns `Ok(None)` on a clean EOF at a
    /// frame boundary (the peer closed the connection between frames).
    pub async fn read_frame<T: DeserializeOwned>(&mut self) -> Result<Option<T>, TransportError> {
        let mut len_buf = [0u8; 4];
        match self.inner.read_exact(&mut len_buf).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(TransportError::Io(e)),
        }
        let len = u32::from_le_bytes(len_buf);
        if len > MAX_FRAME_BYTES {
            return Err(TransportError::FrameTooLarge { len, max: MAX_FRAME_BYTES });
        }

        let mut body = vec![0u8; len as usize];
        self.inner.read_exact(&mut body).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                TransportError::UnexpectedEof
            } else {
                TransportError::Io(e)
            }
        })?;

        let value = bincode::deserialize(&body)?;
        Ok(Some(value))
    }

    /// Encode and write one frame, flushing immediately (requests/responses
    /// are small and latency-sensitive; no batching is worth the complexity).
    pub async fn write_frame<T: Serialize>(&mut self, value: &T) -> Result<(), TransportError> {
        let body = bincode::serialize(value)?;
        let len = u32::try_from(body.len()).map_err(|_| TransportError::FrameTooLarge {
            len: u32::MAX,
            max: MAX_FRAME_BYTES,
        })?;
        if len > MAX_FRAME_BYTES {
            return Err(TransportError::FrameTooLarge { len, max: MAX_FRAME_BYTES });
        }
        self.inner.write_all(&len.to_le_bytes()).await?;
        self.inner.write_all(&body).await?;
        self.inner.flush().await?;
        Ok(())
    }
}
