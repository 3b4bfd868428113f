//! Value codec shared by every block decoder.
//!
//! `FieldReader` wraps an already length-delimited payload and exposes
//! bounds-checked primitive reads (u8, little-endian u16/f32), NUL-padded
//! ASCII strings, ASCII-digit integers and dates, plus the two protocol
//! conventions every layout relies on: reserved ranges that must be zero and
//! 0/255 validity flags. Offsets are always payload offsets.

pub mod error;
pub mod reader;

pub use error::FieldError;
pub use reader::{FLAG_INVALID, FLAG_VALID, FieldReader};
