use std::ops::Range;

// Telemetry header, shared by every lead.
pub const HEADER_RESERVED_RANGE: Range<usize> = 0..2;
pub const LEAD_OFFSET: usize = 2;
pub const HEADER_RESERVED_TAIL_RANGE: Range<usize> = 3..4;
pub const HEADER_LEN: usize = 4;

pub const LEAD_ECG_RESP: u8 = 0x14;
pub const LEAD_SPO2_PLETH: u8 = 0x15;
pub const LEAD_NIBP: u8 = 0x16;
pub const LEAD_TEMPERATURE: u8 = 0x17;

// ECG / respiration (lead 0x14).
pub const ECG1_RANGE: Range<usize> = 0x004..0x104;
pub const ECG2_RANGE: Range<usize> = 0x104..0x204;
pub const ECG3_RANGE: Range<usize> = 0x204..0x304;
pub const RESP_WAVE_RANGE: Range<usize> = 0x304..0x384;
pub const HR_OFFSET: usize = 0x384;
pub const HR_FLAG_OFFSET: usize = 0x385;
pub const RR_OFFSET: usize = 0x386;
pub const RR_FLAG_OFFSET: usize = 0x387;
pub const ECG_UNKNOWN_FLOAT_RANGES: [Range<usize>; 3] = [0x388..0x38C, 0x38C..0x390, 0x390..0x394];
pub const ECG_UNKNOWN_394_RANGE: Range<usize> = 0x394..0x3A3;
pub const HR_ALARM_RANGE: Range<usize> = 0x3A3..0x3A9;
pub const RESP_ALARM_RANGE: Range<usize> = 0x3A9..0x3AF;
/// Three (f32, f32, u16) groups of undecoded values.
pub const ECG_UNKNOWN_GROUP_START: usize = 0x3AF;
pub const ECG_UNKNOWN_GROUP_LEN: usize = 10;
pub const ECG_UNKNOWN_GROUP_COUNT: usize = 3;
pub const PVC_ALARM_RANGE: Range<usize> = 0x3CD..0x3D3;
pub const ECG_TRAILER_OFFSET: usize = 0x3D3;

// SpO2 / pleth (lead 0x15).
pub const PLETH_RANGE: Range<usize> = 0x004..0x104;
pub const SPO2_OFFSET: usize = 0x104;
pub const SPO2_ATTACHED_OFFSET: usize = 0x105;
pub const SPO2_HR_OFFSET: usize = 0x106;
pub const SPO2_VALID_OFFSET: usize = 0x107;
pub const SPO2_ALARM_RANGE: Range<usize> = 0x108..0x10E;
pub const SPO2_HR_ALARM_RANGE: Range<usize> = 0x10E..0x114;
pub const SPO2_TRAILER_OFFSET: usize = 0x114;

// NIBP (lead 0x16).
pub const NIBP_YEAR_RANGE: Range<usize> = 0x04..0x06;
pub const NIBP_MONTH_OFFSET: usize = 0x06;
pub const NIBP_DAY_OFFSET: usize = 0x07;
pub const NIBP_HOUR_OFFSET: usize = 0x08;
pub const NIBP_MINUTE_OFFSET: usize = 0x09;
pub const NIBP_SECOND_OFFSET: usize = 0x0A;
pub const NIBP_SYS_RANGE: Range<usize> = 0x0B..0x0D;
pub const NIBP_DIA_RANGE: Range<usize> = 0x0D..0x0F;
pub const NIBP_MAP_RANGE: Range<usize> = 0x0F..0x11;
pub const NIBP_SYS_ALARM_RANGE: Range<usize> = 0x11..0x17;
pub const NIBP_DIA_ALARM_RANGE: Range<usize> = 0x17..0x1D;
pub const NIBP_MAP_ALARM_RANGE: Range<usize> = 0x1D..0x23;
pub const NIBP_TRAILER_OFFSET: usize = 0x23;

// Temperature (lead 0x17).
pub const T1_RANGE: Range<usize> = 0x04..0x08;
pub const T2_RANGE: Range<usize> = 0x08..0x0C;
pub const TD_RANGE: Range<usize> = 0x0C..0x10;
/// Per channel: max f32, min f32, set u16.
pub const TEMP_ALARM_STARTS: [usize; 3] = [0x10, 0x1A, 0x24];
pub const TEMP_ALARM_LEN: usize = 10;
pub const TEMP_TRAILER_OFFSET: usize = 0x2E;
