use thiserror::Error;

use crate::codec::FieldError;

/// A block whose frame was well-formed but whose contents failed validation.
///
/// The stream is still aligned when this is returned; callers may log it and
/// continue with the next frame. The raw payload is kept for diagnosis.
///
/// # Examples
/// ```
/// use cmsdecode_core::{FieldError, decode_block};
///
/// let err = decode_block(0x45, &[0x00, 0x01, 0x07, 0xFF]).unwrap_err();
/// assert_eq!(err.block_type, 0x45);
/// assert_eq!(err.declared_length, 6);
/// assert_eq!(err.kind, FieldError::ReservedNonZero { offset: 1, value: 1 });
/// assert_eq!(err.payload_hex(), "00 01 07 ff");
/// assert!(err.to_string().ends_with("expected 0 [00 01 07 ff]"));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "block type {block_type:#04x} (length {declared_length:#06x}): {kind} [{}]",
    crate::record::hex_bytes(.payload)
)]
pub struct DecodeError {
    pub block_type: u8,
    pub declared_length: u16,
    pub payload: Vec<u8>,
    #[source]
    pub kind: FieldError,
}

impl DecodeError {
    pub(crate) fn new(block_type: u8, payload: &[u8], kind: FieldError) -> Self {
        Self {
            block_type,
            declared_length: u16::try_from(payload.len() + 2).unwrap_or(u16::MAX),
            payload: payload.to_vec(),
            kind,
        }
    }

    /// Payload offset of the offending byte, when known.
    pub fn offset(&self) -> Option<usize> {
        self.kind.offset()
    }

    /// Raw payload as space-separated hex bytes.
    pub fn payload_hex(&self) -> String {
        crate::record::hex_bytes(&self.payload)
    }
}
