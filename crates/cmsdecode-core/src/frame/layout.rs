use std::ops::Range;

pub const LENGTH_RANGE: Range<usize> = 0..2;
pub const MAGIC_OFFSET: usize = 2;
pub const TYPE_OFFSET: usize = 3;
pub const HEADER_LEN: usize = 4;

/// Bytes of the header counted by `declared_length` (magic + type).
pub const COUNTED_HEADER_LEN: u16 = 2;

pub const MAGIC: u8 = 0x05;
