use std::ops::Range;

use time::{Date, Month};
use tracing::warn;

use super::error::FieldError;
use crate::config::{DecodeConfig, ReservedPolicy};

/// Flag byte meaning "adjacent value present".
pub const FLAG_VALID: u8 = 0x00;
/// Flag byte meaning "adjacent value absent"; the value then holds the same pattern.
pub const FLAG_INVALID: u8 = 0xFF;

pub struct FieldReader<'a> {
    payload: &'a [u8],
    block_type: u8,
    config: DecodeConfig,
}

impl<'a> FieldReader<'a> {
    pub fn new(payload: &'a [u8], block_type: u8, config: DecodeConfig) -> Self {
        Self {
            payload,
            block_type,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), FieldError> {
        if self.payload.len() < needed {
            return Err(FieldError::OutOfBounds {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn require_exact_len(&self, expected: usize) -> Result<(), FieldError> {
        if self.payload.len() != expected {
            return Err(FieldError::UnexpectedLength {
                expected,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FieldError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(FieldError::OutOfBounds {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], FieldError> {
        self.payload
            .get(range.clone())
            .ok_or(FieldError::OutOfBounds {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    /// Everything from `start` to the end of the payload.
    pub fn read_tail(&self, start: usize) -> Result<&'a [u8], FieldError> {
        self.read_slice(start..self.payload.len().max(start))
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, FieldError> {
        let bytes = self.read_array::<2>(range)?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_f32_le(&self, range: Range<usize>) -> Result<f32, FieldError> {
        let bytes = self.read_array::<4>(range)?;
        Ok(f32::from_le_bytes(bytes))
    }

    fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], FieldError> {
        let bytes = self.read_slice(range.clone())?;
        bytes.try_into().map_err(|_| FieldError::MalformedValue {
            offset: range.start,
            reason: format!("expected {N}-byte field, layout range holds {}", bytes.len()),
        })
    }

    /// Fixed-length NUL-padded string; trailing NULs are dropped.
    pub fn read_ascii_string(&self, range: Range<usize>) -> Result<String, FieldError> {
        let bytes = self.read_slice(range)?;
        let raw = String::from_utf8_lossy(bytes);
        Ok(raw.trim_end_matches('\0').to_string())
    }

    /// Fixed-width ASCII-digit integer, e.g. `b"2019\0"`.
    pub fn read_ascii_digits(&self, range: Range<usize>) -> Result<u32, FieldError> {
        let offset = range.start;
        let bytes = self.read_slice(range)?;
        let text = String::from_utf8_lossy(bytes);
        let digits = text.trim_end_matches('\0').trim_matches(|c: char| c.is_ascii_whitespace());
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::MalformedValue {
                offset,
                reason: format!("expected ASCII digits, got {text:?}"),
            });
        }
        digits.parse::<u32>().map_err(|e| FieldError::MalformedValue {
            offset,
            reason: e.to_string(),
        })
    }

    /// Calendar date stored as three ASCII-digit fields (year, month, day).
    pub fn read_ascii_date(
        &self,
        year: Range<usize>,
        month: Range<usize>,
        day: Range<usize>,
    ) -> Result<Date, FieldError> {
        let start = year.start;
        let y = self.read_date_part(year)?;
        let m = self.read_date_part(month)?;
        let d = self.read_date_part(day)?;
        calendar_date(y, m, d).ok_or(FieldError::BadDate {
            offset: start,
            text: format!("{y:04}-{m:02}-{d:02}"),
        })
    }

    fn read_date_part(&self, range: Range<usize>) -> Result<u32, FieldError> {
        self.read_ascii_digits(range.clone()).map_err(|err| match err {
            FieldError::MalformedValue { offset, .. } => FieldError::BadDate {
                offset,
                text: self
                    .read_slice(range)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default(),
            },
            other => other,
        })
    }

    /// Reserved range: every byte must be zero.
    ///
    /// Under `ReservedPolicy::Tolerate` the first nonzero byte is logged and
    /// decoding continues.
    pub fn require_zero(&self, range: Range<usize>) -> Result<(), FieldError> {
        let start = range.start;
        let bytes = self.read_slice(range)?;
        let Some((idx, value)) = bytes.iter().copied().enumerate().find(|(_, b)| *b != 0) else {
            return Ok(());
        };
        let offset = start + idx;
        match self.config.reserved {
            ReservedPolicy::Strict => Err(FieldError::ReservedNonZero { offset, value }),
            ReservedPolicy::Tolerate => {
                warn!(
                    block_type = self.block_type,
                    offset, value, "nonzero byte in reserved range"
                );
                Ok(())
            }
        }
    }

    /// Reserved range running to the end of the payload.
    pub fn require_zero_tail(&self, start: usize) -> Result<(), FieldError> {
        self.require_zero(start..self.payload.len().max(start))
    }

    /// Bare 0/255 flag: `true` for 0, `false` for 255.
    pub fn read_flag(&self, offset: usize) -> Result<bool, FieldError> {
        let flag = self.read_u8(offset)?;
        match flag {
            FLAG_VALID => Ok(true),
            FLAG_INVALID => Ok(false),
            _ => Err(FieldError::BadSentinel {
                offset,
                flag,
                value: flag,
            }),
        }
    }

    /// Validity flag governing one or more value bytes.
    ///
    /// When the flag is 255 every governed byte must hold 255 as well.
    pub fn read_validity(&self, flag_offset: usize, values: &[usize]) -> Result<bool, FieldError> {
        let flag = self.read_u8(flag_offset)?;
        match flag {
            FLAG_VALID => Ok(true),
            FLAG_INVALID => {
                for &offset in values {
                    let value = self.read_u8(offset)?;
                    if value != FLAG_INVALID {
                        return Err(FieldError::BadSentinel {
                            offset,
                            flag,
                            value,
                        });
                    }
                }
                Ok(false)
            }
            _ => {
                let value = match values.first() {
                    Some(&offset) => self.read_u8(offset)?,
                    None => flag,
                };
                Err(FieldError::BadSentinel {
                    offset: flag_offset,
                    flag,
                    value,
                })
            }
        }
    }

    /// A (value, flag) pair: `Some(value)` when valid, `None` when flagged invalid.
    pub fn read_sentinel_u8(
        &self,
        value_offset: usize,
        flag_offset: usize,
    ) -> Result<Option<u8>, FieldError> {
        let value = self.read_u8(value_offset)?;
        let valid = self.read_validity(flag_offset, &[value_offset])?;
        Ok(valid.then_some(value))
    }
}

fn calendar_date(year: u32, month: u32, day: u32) -> Option<Date> {
    let year = i32::try_from(year).ok()?;
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    Date::from_calendar_date(year, month, u8::try_from(day).ok()?).ok()
}
