//! Typed block decoders and the dispatcher that selects them.
//!
//! Every decoder reads through `FieldReader`, so offsets live in `layout`
//! modules and no decoder indexes a payload directly.

pub mod bed;
pub mod error;
pub mod layout;
pub mod notice;
pub mod parser;
pub mod patient;
pub mod telemetry;

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::record::{FieldValue, Record, UnknownField, hex_bytes};

pub use bed::BedAssign;
pub use error::DecodeError;
pub use notice::ErrorNotice;
pub use parser::{decode_block, decode_block_with, decode_frame_block, decode_frame_block_with};
pub use patient::PatientInfo;
pub use telemetry::{Lead, Telemetry};

/// Which empty synchronization block was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    /// Type 0x43.
    Marker43,
    /// Type 0x47, closes one telemetry cycle.
    EndOfCycle,
}

/// Block with an unrecognized type code, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub block_type: u8,
    pub payload: Vec<u8>,
}

/// One decoded block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    PatientInfo(PatientInfo),
    SyncMarker { kind: SyncKind },
    BedAssign(BedAssign),
    Telemetry(Telemetry),
    ErrorNotice(ErrorNotice),
    Raw(RawBlock),
}

impl Block {
    pub fn block_type(&self) -> u8 {
        match self {
            Block::PatientInfo(_) => layout::PATIENT_INFO,
            Block::SyncMarker {
                kind: SyncKind::Marker43,
            } => layout::SYNC_MARKER,
            Block::SyncMarker {
                kind: SyncKind::EndOfCycle,
            } => layout::END_OF_CYCLE,
            Block::BedAssign(_) => layout::BED_ASSIGN,
            Block::Telemetry(_) => layout::TELEMETRY,
            Block::ErrorNotice(_) => layout::ERROR_NOTICE,
            Block::Raw(raw) => raw.block_type,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Block::PatientInfo(_) => "patient_info",
            Block::SyncMarker { .. } => "sync",
            Block::BedAssign(_) => "bed_assign",
            Block::Telemetry(_) => "telemetry",
            Block::ErrorNotice(_) => "error_notice",
            Block::Raw(_) => "raw",
        }
    }

    /// True for the 0x47 marker that closes a telemetry cycle.
    pub fn is_end_of_cycle(&self) -> bool {
        matches!(
            self,
            Block::SyncMarker {
                kind: SyncKind::EndOfCycle
            }
        )
    }

    fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Block::PatientInfo(block) => Some(block),
            Block::BedAssign(block) => Some(block),
            Block::Telemetry(block) => Some(block),
            Block::ErrorNotice(block) => Some(block),
            Block::SyncMarker { .. } | Block::Raw(_) => None,
        }
    }
}

impl Record for Block {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        self.as_record()
            .map(|block| block.values())
            .unwrap_or_default()
    }

    fn waveforms(&self) -> Vec<(&'static str, &[u8])> {
        self.as_record()
            .map(|block| block.waveforms())
            .unwrap_or_default()
    }

    fn unknown(&self) -> Vec<(&'static str, UnknownField)> {
        match self {
            Block::Raw(raw) => vec![("data", UnknownField::Bytes(raw.payload.clone()))],
            block => block
                .as_record()
                .map(|block| block.unknown())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message type {:02x} [{}]", self.block_type(), self.name())?;
        match self {
            Block::Raw(raw) => write!(
                f,
                ", length {:4x}, data: {}",
                raw.payload.len(),
                hex_bytes(&raw.payload)
            ),
            Block::SyncMarker { .. } => Ok(()),
            block => {
                if let Block::Telemetry(telemetry) = block {
                    write!(f, ", lead_type: {:02x}", telemetry.lead)?;
                }
                let mut values = block.values();
                values.sort_by(|a, b| a.0.cmp(b.0));
                f.write_str(", values: [")?;
                for (idx, (name, value)) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Serializes `(name, value)` pairs as a JSON object.
struct Named<'a, T>(&'a [(&'static str, T)]);

impl<T: Serialize> Serialize for Named<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, value)| (*name, value)))
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Block", 6)?;
        state.serialize_field("block_type", &self.block_type())?;
        state.serialize_field("name", self.name())?;
        match self {
            Block::Telemetry(telemetry) => {
                state.serialize_field("lead", &Some(telemetry.data.name()))?
            }
            _ => state.serialize_field("lead", &None::<&str>)?,
        }
        state.serialize_field("values", &Named(&self.values()))?;
        state.serialize_field("waveforms", &Named(&self.waveforms()))?;
        state.serialize_field("unknown", &Named(&self.unknown()))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, RawBlock, SyncKind, decode_block};
    use crate::record::Record;

    #[test]
    fn record_capabilities_per_variant() {
        let bed = decode_block(0x45, &[0, 0, 3, 0xFF]).unwrap();
        assert!(bed.has_values());
        assert!(!bed.has_waveforms());
        assert!(!bed.has_unknown());

        let sync = Block::SyncMarker {
            kind: SyncKind::EndOfCycle,
        };
        assert!(sync.is_end_of_cycle());
        assert!(!sync.has_values());

        let raw = Block::Raw(RawBlock {
            block_type: 0x50,
            payload: vec![0xAA],
        });
        assert!(raw.has_unknown());
    }

    #[test]
    fn display_lists_sorted_values() {
        let notice = decode_block(0x49, b"\x2AER").unwrap();
        assert_eq!(
            notice.to_string(),
            "message type 49 [error_notice], values: [error_code: 42, error_message: ER]"
        );
        let raw = decode_block(0x50, &[0x01, 0xFF]).unwrap();
        assert_eq!(raw.to_string(), "message type 50 [raw], length    2, data: 01 ff");
    }

    #[test]
    fn serializes_to_json() {
        let bed = decode_block(0x45, &[0, 0, 7, 0xFF]).unwrap();
        let json = serde_json::to_value(&bed).unwrap();
        assert_eq!(json["block_type"], 0x45);
        assert_eq!(json["name"], "bed_assign");
        assert!(json["lead"].is_null());
        assert_eq!(json["values"]["bed"], 7);

        let payload = crate::blocks::telemetry::spo2::tests::sample_payload(0xFF, 0, 0xFF, 0xFF);
        let json = serde_json::to_value(decode_block(0x46, &payload).unwrap()).unwrap();
        assert_eq!(json["lead"], "spo2_pleth");
        assert!(json["values"]["spo2"].is_null());
        assert_eq!(json["values"]["spo2_valid"], false);
        assert_eq!(json["waveforms"]["pleth"].as_array().unwrap().len(), 256);
    }
}
