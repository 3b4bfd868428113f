use std::ops::Range;

pub const PATIENT_INFO: u8 = 0x3E;
pub const SYNC_MARKER: u8 = 0x43;
pub const BED_ASSIGN: u8 = 0x45;
pub const TELEMETRY: u8 = 0x46;
pub const END_OF_CYCLE: u8 = 0x47;
pub const ERROR_NOTICE: u8 = 0x49;

// Patient info (0x3E).
pub const PATIENT_DEPARTMENT_RANGE: Range<usize> = 0x00..0x20;
pub const PATIENT_RESERVED_1_RANGE: Range<usize> = 0x20..0x22;
pub const PATIENT_BED_OFFSET: usize = 0x22;
pub const PATIENT_NAME_RANGE: Range<usize> = 0x23..0x43;
pub const PATIENT_NUMBER_RANGE: Range<usize> = 0x43..0x63;
pub const PATIENT_ADMIT_YEAR_RANGE: Range<usize> = 0x63..0x68;
pub const PATIENT_ADMIT_MONTH_RANGE: Range<usize> = 0x68..0x6B;
pub const PATIENT_ADMIT_DAY_RANGE: Range<usize> = 0x6B..0x6E;
pub const PATIENT_RESERVED_2_RANGE: Range<usize> = 0x6E..0x74;
pub const PATIENT_HEIGHT_RANGE: Range<usize> = 0x74..0x76;
pub const PATIENT_WEIGHT_RANGE: Range<usize> = 0x76..0x78;
pub const PATIENT_UNKNOWN_78_RANGE: Range<usize> = 0x78..0x7C;
pub const PATIENT_BIRTH_YEAR_RANGE: Range<usize> = 0x7C..0x81;
pub const PATIENT_BIRTH_MONTH_RANGE: Range<usize> = 0x81..0x84;
pub const PATIENT_BIRTH_DAY_RANGE: Range<usize> = 0x84..0x87;
pub const PATIENT_RESERVED_3_RANGE: Range<usize> = 0x87..0x8B;
pub const PATIENT_UNKNOWN_8B_OFFSET: usize = 0x8B;
pub const PATIENT_BLOOD_TYPE_OFFSET: usize = 0x8C;
pub const PATIENT_DOCTOR_RANGE: Range<usize> = 0x8D..0xAD;
pub const PATIENT_TRAILER_OFFSET: usize = 0xAD;
pub const PATIENT_MIN_LEN: usize = PATIENT_TRAILER_OFFSET;

/// Height is transmitted in millimetres.
pub const HEIGHT_SCALE: f64 = 1000.0;
/// Weight is transmitted in tenths of a kilogram.
pub const WEIGHT_SCALE: f64 = 10.0;

// Bed assignment (0x45).
pub const BED_RESERVED_RANGE: Range<usize> = 0..2;
pub const BED_NUMBER_OFFSET: usize = 2;
pub const BED_MARKER_OFFSET: usize = 3;
pub const BED_MARKER: u8 = 0xFF;
pub const BED_ASSIGN_LEN: usize = 4;

// Error notice (0x49).
pub const NOTICE_CODE_OFFSET: usize = 0;
pub const NOTICE_MESSAGE_OFFSET: usize = 1;
