//! Telemetry blocks (0x46).
//!
//! A four byte header carries the lead byte, which selects one of four
//! fixed layouts. Unrecognized leads keep their bytes verbatim.

pub mod ecg;
pub mod layout;
pub mod nibp;
pub mod spo2;
pub mod temperature;

use std::ops::Range;

use tracing::trace;

use crate::codec::{FieldError, FieldReader};
use crate::record::{FieldValue, Record, UnknownField};

pub use ecg::{EcgResp, EcgUnknownGroup};
pub use nibp::Nibp;
pub use spo2::Spo2Pleth;
pub use temperature::{Temperature, TemperatureAlarm};

#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub lead: u8,
    pub data: Lead,
}

/// Lead-specific telemetry contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Lead {
    EcgResp(EcgResp),
    Spo2Pleth(Spo2Pleth),
    Nibp(Nibp),
    Temperature(Temperature),
    /// Lead byte without a known layout; bytes after the header.
    Unknown { raw: Vec<u8> },
}

impl Lead {
    pub fn name(&self) -> &'static str {
        match self {
            Lead::EcgResp(_) => "ecg_resp",
            Lead::Spo2Pleth(_) => "spo2_pleth",
            Lead::Nibp(_) => "nibp",
            Lead::Temperature(_) => "temperature",
            Lead::Unknown { .. } => "unknown",
        }
    }

    fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Lead::EcgResp(lead) => Some(lead),
            Lead::Spo2Pleth(lead) => Some(lead),
            Lead::Nibp(lead) => Some(lead),
            Lead::Temperature(lead) => Some(lead),
            Lead::Unknown { .. } => None,
        }
    }
}

pub fn parse_telemetry(reader: &FieldReader<'_>) -> Result<Telemetry, FieldError> {
    reader.require_len(layout::HEADER_LEN)?;
    reader.require_zero(layout::HEADER_RESERVED_RANGE)?;
    let lead = reader.read_u8(layout::LEAD_OFFSET)?;
    reader.require_zero(layout::HEADER_RESERVED_TAIL_RANGE)?;

    let data = match lead {
        layout::LEAD_ECG_RESP => Lead::EcgResp(ecg::parse_ecg_resp(reader)?),
        layout::LEAD_SPO2_PLETH => Lead::Spo2Pleth(spo2::parse_spo2_pleth(reader)?),
        layout::LEAD_NIBP => Lead::Nibp(nibp::parse_nibp(reader)?),
        layout::LEAD_TEMPERATURE => Lead::Temperature(temperature::parse_temperature(reader)?),
        other => {
            trace!(lead = other, "unrecognized telemetry lead kept raw");
            Lead::Unknown {
                raw: reader.read_tail(layout::HEADER_LEN)?.to_vec(),
            }
        }
    };
    Ok(Telemetry { lead, data })
}

/// Three consecutive little-endian words, in wire order.
pub(crate) fn read_u16_triple(
    reader: &FieldReader<'_>,
    range: Range<usize>,
) -> Result<[u16; 3], FieldError> {
    let start = range.start;
    reader.read_slice(range)?;
    Ok([
        reader.read_u16_le(start..start + 2)?,
        reader.read_u16_le(start + 2..start + 4)?,
        reader.read_u16_le(start + 4..start + 6)?,
    ])
}

impl Record for Telemetry {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        self.data
            .as_record()
            .map(|lead| lead.values())
            .unwrap_or_default()
    }

    fn waveforms(&self) -> Vec<(&'static str, &[u8])> {
        self.data
            .as_record()
            .map(|lead| lead.waveforms())
            .unwrap_or_default()
    }

    fn unknown(&self) -> Vec<(&'static str, UnknownField)> {
        match &self.data {
            Lead::Unknown { raw } => vec![("unk_4", UnknownField::Bytes(raw.clone()))],
            lead => lead
                .as_record()
                .map(|lead| lead.unknown())
                .unwrap_or_default(),
        }
    }
}
