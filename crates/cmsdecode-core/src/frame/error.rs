use thiserror::Error;

/// Structural framing errors.
///
/// # Examples
/// ```
/// use cmsdecode_core::FrameError;
///
/// let err = FrameError::BadMagic { magic: 0x06, block_type: 0x46 };
/// assert!(err.to_string().contains("bad frame magic"));
/// ```
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("short frame: declared length {declared_length} is below 2")]
    ShortFrame { declared_length: u16 },
    #[error("bad frame magic {magic:#04x} (expected 0x05) before type {block_type:#04x}")]
    BadMagic { magic: u8, block_type: u8 },
    #[error("truncated frame header: need {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },
    #[error(
        "truncated payload for block type {block_type:#04x}: need {needed} bytes, got {actual}"
    )]
    TruncatedPayload {
        block_type: u8,
        needed: usize,
        actual: usize,
        partial: Vec<u8>,
    },
    #[error("stream lost frame alignment after an interrupted or failed read")]
    Desynchronized,
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
