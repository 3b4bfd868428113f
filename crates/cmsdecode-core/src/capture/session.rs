use std::collections::BTreeMap;

use crate::blocks::Block;
use crate::record::{FieldValue, Record};

const DEFAULT_DEPARTMENT: &str = "unknown";
const DEFAULT_BED: i64 = 0;

/// Latest known state of one monitor, accumulated across blocks.
///
/// The decoder itself is stateless; consumers that need "last department and
/// bed" or "latest heart rate" fold blocks into this.
#[derive(Debug, Clone)]
pub struct SessionState {
    department: String,
    bed: i64,
    time: Option<f64>,
    values: BTreeMap<&'static str, FieldValue>,
    waveforms: BTreeMap<&'static str, Vec<u8>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            department: DEFAULT_DEPARTMENT.to_string(),
            bed: DEFAULT_BED,
            time: None,
            values: BTreeMap::new(),
            waveforms: BTreeMap::new(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the named values and waveforms of `block` into the state.
    pub fn apply(&mut self, block: &Block) {
        for (name, value) in block.values() {
            match (name, &value) {
                ("department", FieldValue::Text(text)) => self.department = text.clone(),
                ("bed", FieldValue::Int(bed)) => self.bed = *bed,
                _ => {}
            }
            self.values.insert(name, value);
        }
        for (name, samples) in block.waveforms() {
            self.waveforms.insert(name, samples.to_vec());
        }
    }

    pub fn set_time(&mut self, ts: Option<f64>) {
        if ts.is_some() {
            self.time = ts;
        }
    }

    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// `"{department}_{bed}"`, e.g. `ICU_12`.
    pub fn device_path(&self) -> String {
        format!("{}_{}", self.department, self.bed)
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn waveform(&self, name: &str) -> Option<&[u8]> {
        self.waveforms.get(name).map(Vec::as_slice)
    }

    /// Scalar names in sorted order.
    pub fn value_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    /// Waveform names in sorted order.
    pub fn waveform_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.waveforms.keys().copied()
    }
}
