use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::error::{FrameError, Result};
use super::layout;
use super::parser::{Frame, check_magic, payload_len};

/// Alignment state of an async reader.
///
/// ```text
///   Aligned --read_frame()--> InFlight --complete--> Aligned
///                                |
///                                +--error / future dropped--> Desynchronized
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReaderState {
    Aligned,
    InFlight,
    Desynchronized,
}

/// Async frame reader for live monitor connections.
///
/// The only suspension point is waiting for bytes from the source. Partial
/// frames are read into call-local buffers, so dropping a pending
/// `read_frame` future (connection closed, `tokio::time::timeout`, task abort)
/// never leaks bytes into a later call. The reader instead remembers that a
/// read was interrupted and reports `Desynchronized` from then on.
///
/// # Examples
/// ```
/// use cmsdecode_core::AsyncFrameReader;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let wire: &[u8] = &[0x06, 0x00, 0x05, 0x45, 0x00, 0x00, 0x07, 0xFF];
/// let mut reader = AsyncFrameReader::new(wire);
/// let frame = reader.read_frame().await?.expect("one frame");
/// assert_eq!(frame.block_type, 0x45);
/// assert!(reader.read_frame().await?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct AsyncFrameReader<R> {
    inner: R,
    state: ReaderState,
}

impl<R: AsyncRead + Unpin> AsyncFrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: ReaderState::Aligned,
        }
    }

    /// Read the next frame, awaiting bytes as they arrive.
    ///
    /// Returns `Ok(None)` when the peer closes the stream on a frame boundary.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.state != ReaderState::Aligned {
            self.state = ReaderState::Desynchronized;
            return Err(FrameError::Desynchronized);
        }
        self.state = ReaderState::InFlight;
        let result = self.read_frame_inner().await;
        self.state = match result {
            Ok(_) => ReaderState::Aligned,
            Err(_) => ReaderState::Desynchronized,
        };
        result
    }

    /// Whether the reader can still produce trustworthy frames.
    pub fn is_aligned(&self) -> bool {
        self.state == ReaderState::Aligned
    }

    async fn read_frame_inner(&mut self) -> Result<Option<Frame>> {
        let mut length = [0u8; 2];
        let got = fill(&mut self.inner, &mut length).await?;
        if got == 0 {
            return Ok(None);
        }
        if got < length.len() {
            return Err(FrameError::TruncatedHeader {
                needed: layout::HEADER_LEN,
                actual: got,
            });
        }
        let declared_length = u16::from_le_bytes(length);
        let len = payload_len(declared_length)?;

        let mut header = [0u8; 2];
        let got = fill(&mut self.inner, &mut header).await?;
        if got < header.len() {
            return Err(FrameError::TruncatedHeader {
                needed: layout::HEADER_LEN,
                actual: length.len() + got,
            });
        }
        let [magic, block_type] = header;
        check_magic(magic, block_type)?;

        let mut payload = vec![0u8; len];
        let got = fill(&mut self.inner, &mut payload).await?;
        if got < len {
            payload.truncate(got);
            return Err(FrameError::TruncatedPayload {
                block_type,
                needed: len,
                actual: got,
                partial: payload,
            });
        }

        debug!(block_type, payload_len = len, "frame received");
        Ok(Some(Frame {
            declared_length,
            magic,
            block_type,
            payload,
        }))
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
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
