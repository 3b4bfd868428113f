use std::io::{ErrorKind, Read};

use tracing::debug;

use super::error::{FrameError, Result};
use super::layout;
use super::parser::{Frame, check_magic, payload_len};

/// Reads complete frames from any blocking `Read` source.
///
/// After a structural error the reader refuses further reads with
/// `FrameError::Desynchronized`.
pub struct FrameReader<R> {
    inner: R,
    desynchronized: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            desynchronized: false,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the source ends cleanly on a frame boundary.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.desynchronized {
            return Err(FrameError::Desynchronized);
        }
        let result = self.read_frame_inner();
        if result.is_err() {
            self.desynchronized = true;
        }
        result
    }

    fn read_frame_inner(&mut self) -> Result<Option<Frame>> {
        let mut length = [0u8; 2];
        let got = fill(&mut self.inner, &mut length)?;
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
        let got = fill(&mut self.inner, &mut header)?;
        if got < header.len() {
            return Err(FrameError::TruncatedHeader {
                needed: layout::HEADER_LEN,
                actual: length.len() + got,
            });
        }
        let [magic, block_type] = header;
        check_magic(magic, block_type)?;

        let mut payload = vec![0u8; len];
        let got = fill(&mut self.inner, &mut payload)?;
        if got < len {
            payload.truncate(got);
            return Err(FrameError::TruncatedPayload {
                block_type,
                needed: len,
                actual: got,
                partial: payload,
            });
        }

        debug!(block_type, payload_len = len, "frame read");
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

/// Read exactly one frame from `source`.
///
/// Nothing past the frame is consumed, so the caller may keep reading from the
/// same source. After an error the source position is unspecified.
///
/// # Examples
/// ```
/// use cmsdecode_core::read_frame;
///
/// let mut wire: &[u8] = &[0x02, 0x00, 0x05, 0x47, 0x02, 0x00, 0x05, 0x43];
/// assert_eq!(read_frame(&mut wire)?.map(|f| f.block_type), Some(0x47));
/// assert_eq!(read_frame(&mut wire)?.map(|f| f.block_type), Some(0x43));
/// assert!(read_frame(&mut wire)?.is_none());
/// # Ok::<(), cmsdecode_core::FrameError>(())
/// ```
pub fn read_frame<R: Read>(source: &mut R) -> Result<Option<Frame>> {
    FrameReader::new(source).read_frame()
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.desynchronized {
            return None;
        }
        self.read_frame().transpose()
    }
}

/// Fill `buf` until full or end-of-stream; returns the byte count read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
