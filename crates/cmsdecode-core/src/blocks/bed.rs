use super::layout;
use crate::codec::{FieldError, FieldReader};
use crate::record::{FieldValue, Record};

/// Bed assignment (block 0x45).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BedAssign {
    pub bed: u8,
}

pub fn parse_bed_assign(reader: &FieldReader<'_>) -> Result<BedAssign, FieldError> {
    reader.require_exact_len(layout::BED_ASSIGN_LEN)?;
    reader.require_zero(layout::BED_RESERVED_RANGE)?;
    let bed = reader.read_u8(layout::BED_NUMBER_OFFSET)?;
    let marker = reader.read_u8(layout::BED_MARKER_OFFSET)?;
    if marker != layout::BED_MARKER {
        return Err(FieldError::BadMarker {
            offset: layout::BED_MARKER_OFFSET,
            expected: layout::BED_MARKER,
            actual: marker,
        });
    }
    Ok(BedAssign { bed })
}

impl Record for BedAssign {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("bed", self.bed.into())]
    }
}
