use thiserror::Error;

/// Field-level decoding failures.
///
/// Every variant except `OutOfBounds` carries the payload offset of the
/// offending byte so protocol drift can be located from a log line alone.
///
/// # Examples
/// ```
/// use cmsdecode_core::FieldError;
///
/// let err = FieldError::ReservedNonZero { offset: 0x20, value: 1 };
/// assert_eq!(err.offset(), Some(0x20));
/// assert!(err.to_string().contains("reserved byte"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    OutOfBounds { needed: usize, actual: usize },
    #[error("malformed value at offset {offset:#x}: {reason}")]
    MalformedValue { offset: usize, reason: String },
    #[error("reserved byte at offset {offset:#x} is {value:#04x}, expected 0")]
    ReservedNonZero { offset: usize, value: u8 },
    #[error("bad sentinel at offset {offset:#x}: flag {flag:#04x}, value {value:#04x}")]
    BadSentinel { offset: usize, flag: u8, value: u8 },
    #[error("bad date at offset {offset:#x}: {text:?}")]
    BadDate { offset: usize, text: String },
    #[error("unexpected payload length: expected {expected}, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },
    #[error("bad marker at offset {offset:#x}: expected {expected:#04x}, got {actual:#04x}")]
    BadMarker { offset: usize, expected: u8, actual: u8 },
}

impl FieldError {
    /// Payload offset of the offending byte, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            FieldError::MalformedValue { offset, .. }
            | FieldError::ReservedNonZero { offset, .. }
            | FieldError::BadSentinel { offset, .. }
            | FieldError::BadDate { offset, .. }
            | FieldError::BadMarker { offset, .. } => Some(*offset),
            FieldError::OutOfBounds { .. } | FieldError::UnexpectedLength { .. } => None,
        }
    }
}
