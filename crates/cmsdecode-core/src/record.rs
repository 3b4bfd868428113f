//! Accessors shared by every decoded record.
//!
//! Collaborators (CSV writers, loggers, publishers) should not need to know
//! block offsets or variants. They ask a record for its named scalars,
//! its named waveform arrays and the regions that are still undecoded.

use std::fmt;

use serde::{Serialize, Serializer};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

/// A named scalar value carried by a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(Date),
    DateTime(PrimitiveDateTime),
    /// The wire marked this value invalid.
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}

impl From<PrimitiveDateTime> for FieldValue {
    fn from(value: PrimitiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Date(v) => write!(f, "{v}"),
            FieldValue::DateTime(v) => match v.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second]"
            )) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{v}"),
            },
            FieldValue::Absent => Ok(()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Int(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Bool(v) => serializer.serialize_bool(*v),
            FieldValue::Absent => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

/// A region whose meaning is not yet known, preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum UnknownField {
    Bytes(Vec<u8>),
    Float(f32),
    Word(u16),
}

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownField::Bytes(bytes) => f.write_str(&hex_bytes(bytes)),
            UnknownField::Float(v) => write!(f, "{v}"),
            UnknownField::Word(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for UnknownField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UnknownField::Bytes(_) => serializer.collect_str(self),
            UnknownField::Float(v) => serializer.serialize_f32(*v),
            UnknownField::Word(v) => serializer.serialize_u16(*v),
        }
    }
}

/// Capability view over a decoded record.
///
/// All methods default to empty so a record only implements what it carries.
pub trait Record {
    /// Named scalar values.
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }

    /// Named waveform sample arrays.
    fn waveforms(&self) -> Vec<(&'static str, &[u8])> {
        Vec::new()
    }

    /// Regions preserved without interpretation.
    fn unknown(&self) -> Vec<(&'static str, UnknownField)> {
        Vec::new()
    }

    fn has_values(&self) -> bool {
        !self.values().is_empty()
    }

    fn has_waveforms(&self) -> bool {
        !self.waveforms().is_empty()
    }

    fn has_unknown(&self) -> bool {
        !self.unknown().is_empty()
    }
}

/// Alarm limits as configured on the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmLimits {
    pub max: u16,
    pub min: u16,
    pub set: u16,
}

impl AlarmLimits {
    pub(crate) fn push_values(
        &self,
        out: &mut Vec<(&'static str, FieldValue)>,
        names: [&'static str; 3],
    ) {
        let [max, min, set] = names;
        out.push((max, self.max.into()));
        out.push((min, self.min.into()));
        out.push((set, self.set.into()));
    }
}

pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
