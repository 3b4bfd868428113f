use tracing::trace;

use super::error::{FrameError, Result};
use super::layout;

/// One length-delimited wire unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub declared_length: u16,
    pub magic: u8,
    pub block_type: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(block_type: u8, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        Self {
            declared_length: u16::try_from(payload.len() + usize::from(layout::COUNTED_HEADER_LEN))
                .unwrap_or(u16::MAX),
            magic: layout::MAGIC,
            block_type,
            payload,
        }
    }

    /// Bytes this frame occupies on the wire (header + payload).
    pub fn wire_size(&self) -> usize {
        layout::HEADER_LEN + self.payload.len()
    }

    /// Serialize back to wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_size());
        out.extend_from_slice(&self.declared_length.to_le_bytes());
        out.push(self.magic);
        out.push(self.block_type);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Validate the declared length and return the payload length.
pub(crate) fn payload_len(declared_length: u16) -> Result<usize> {
    if declared_length < layout::COUNTED_HEADER_LEN {
        return Err(FrameError::ShortFrame { declared_length });
    }
    Ok((declared_length - layout::COUNTED_HEADER_LEN) as usize)
}

pub(crate) fn check_magic(magic: u8, block_type: u8) -> Result<()> {
    if magic != layout::MAGIC {
        return Err(FrameError::BadMagic { magic, block_type });
    }
    Ok(())
}

/// Read the frame starting at `offset` in a captured buffer.
///
/// The caller advances its own offset by `frame.wire_size()` to reach the
/// next frame packed back-to-back in the same buffer. A buffer that ends
/// early yields `TruncatedHeader`/`TruncatedPayload`, never a short payload.
pub fn read_frame_from_bytes(buf: &[u8], offset: usize) -> Result<Frame> {
    let rest = buf.get(offset..).unwrap_or_default();
    let header_needed = layout::LENGTH_RANGE.end;
    let Some(length_bytes) = rest.get(layout::LENGTH_RANGE) else {
        return Err(FrameError::TruncatedHeader {
            needed: layout::HEADER_LEN,
            actual: rest.len().min(header_needed),
        });
    };
    let declared_length = u16::from_le_bytes([length_bytes[0], length_bytes[1]]);
    let len = payload_len(declared_length)?;

    let (Some(&magic), Some(&block_type)) =
        (rest.get(layout::MAGIC_OFFSET), rest.get(layout::TYPE_OFFSET))
    else {
        return Err(FrameError::TruncatedHeader {
            needed: layout::HEADER_LEN,
            actual: rest.len(),
        });
    };
    check_magic(magic, block_type)?;

    let body = &rest[layout::HEADER_LEN..];
    if body.len() < len {
        return Err(FrameError::TruncatedPayload {
            block_type,
            needed: len,
            actual: body.len(),
            partial: body.to_vec(),
        });
    }

    trace!(offset, block_type, payload_len = len, "frame sliced from buffer");
    Ok(Frame {
        declared_length,
        magic,
        block_type,
        payload: body[..len].to_vec(),
    })
}

/// Decode a frame from the front of a reassembly buffer.
///
/// Returns `Ok(None)` when the buffer does not hold a complete frame yet, or
/// the frame together with the number of bytes it consumed.
pub fn decode_frame(buf: &[u8]) -> Result<Option<(Frame, usize)>> {
    match read_frame_from_bytes(buf, 0) {
        Ok(frame) => {
            let consumed = frame.wire_size();
            Ok(Some((frame, consumed)))
        }
        Err(FrameError::TruncatedHeader { .. } | FrameError::TruncatedPayload { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Iterator over frames packed back-to-back in one buffer.
///
/// Stops after the buffer is exhausted or after yielding the first error,
/// since alignment is lost at that point.
///
/// # Examples
/// ```
/// use cmsdecode_core::FrameIter;
///
/// let buf = [0x02, 0x00, 0x05, 0x47, 0x02, 0x00, 0x05, 0x43];
/// let types: Vec<u8> = FrameIter::new(&buf)
///     .map(|frame| frame.unwrap().block_type)
///     .collect();
/// assert_eq!(types, vec![0x47, 0x43]);
/// ```
pub struct FrameIter<'a> {
    buf: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> FrameIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buf.len() {
            return None;
        }
        match read_frame_from_bytes(self.buf, self.offset) {
            Ok(frame) => {
                self.offset += frame.wire_size();
                Some(Ok(frame))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
