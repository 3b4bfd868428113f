use super::{layout, read_u16_triple};
use crate::codec::{FieldError, FieldReader};
use crate::record::{AlarmLimits, FieldValue, Record, UnknownField};

/// Undecoded `(f32, f32, u16)` group following the HR/resp alarms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EcgUnknownGroup {
    pub a: f32,
    pub b: f32,
    pub word: u16,
}

/// ECG and respiration waveforms with heart and respiration rates (lead 0x14).
#[derive(Debug, Clone, PartialEq)]
pub struct EcgResp {
    pub ecg1: Vec<u8>,
    pub ecg2: Vec<u8>,
    pub ecg3: Vec<u8>,
    pub resp_wave: Vec<u8>,
    pub heart_rate: Option<u8>,
    pub resp_rate: Option<u8>,
    pub hr_alarm: AlarmLimits,
    pub resp_alarm: AlarmLimits,
    pub pvc_alarm: AlarmLimits,
    pub unknown_floats: [f32; 3],
    pub unknown_394: Vec<u8>,
    pub unknown_groups: [EcgUnknownGroup; layout::ECG_UNKNOWN_GROUP_COUNT],
}

const UNKNOWN_FLOAT_NAMES: [&str; 3] = ["unk_388_f", "unk_38c_f", "unk_390_f"];
const UNKNOWN_GROUP_NAMES: [[&str; 3]; layout::ECG_UNKNOWN_GROUP_COUNT] = [
    ["unk_3af_f", "unk_3b3_f", "unk_3b7_d"],
    ["unk_3b9_f", "unk_3bd_f", "unk_3c1_d"],
    ["unk_3c3_f", "unk_3c7_f", "unk_3cb_d"],
];

pub fn parse_ecg_resp(reader: &FieldReader<'_>) -> Result<EcgResp, FieldError> {
    let ecg1 = reader.read_slice(layout::ECG1_RANGE)?.to_vec();
    let ecg2 = reader.read_slice(layout::ECG2_RANGE)?.to_vec();
    let ecg3 = reader.read_slice(layout::ECG3_RANGE)?.to_vec();
    let resp_wave = reader.read_slice(layout::RESP_WAVE_RANGE)?.to_vec();

    let heart_rate = reader.read_sentinel_u8(layout::HR_OFFSET, layout::HR_FLAG_OFFSET)?;
    let resp_rate = reader.read_sentinel_u8(layout::RR_OFFSET, layout::RR_FLAG_OFFSET)?;

    let mut unknown_floats = [0f32; 3];
    for (slot, range) in unknown_floats.iter_mut().zip(layout::ECG_UNKNOWN_FLOAT_RANGES) {
        *slot = reader.read_f32_le(range)?;
    }
    let unknown_394 = reader.read_slice(layout::ECG_UNKNOWN_394_RANGE)?.to_vec();

    let [max, min, set] = read_u16_triple(reader, layout::HR_ALARM_RANGE)?;
    let hr_alarm = AlarmLimits { max, min, set };
    let [max, min, set] = read_u16_triple(reader, layout::RESP_ALARM_RANGE)?;
    let resp_alarm = AlarmLimits { max, min, set };

    let mut unknown_groups = [EcgUnknownGroup::default(); layout::ECG_UNKNOWN_GROUP_COUNT];
    for (idx, group) in unknown_groups.iter_mut().enumerate() {
        let start = layout::ECG_UNKNOWN_GROUP_START + idx * layout::ECG_UNKNOWN_GROUP_LEN;
        *group = EcgUnknownGroup {
            a: reader.read_f32_le(start..start + 4)?,
            b: reader.read_f32_le(start + 4..start + 8)?,
            word: reader.read_u16_le(start + 8..start + 10)?,
        };
    }

    let [max, min, set] = read_u16_triple(reader, layout::PVC_ALARM_RANGE)?;
    let pvc_alarm = AlarmLimits { max, min, set };
    reader.require_zero_tail(layout::ECG_TRAILER_OFFSET)?;

    Ok(EcgResp {
        ecg1,
        ecg2,
        ecg3,
        resp_wave,
        heart_rate,
        resp_rate,
        hr_alarm,
        resp_alarm,
        pvc_alarm,
        unknown_floats,
        unknown_394,
        unknown_groups,
    })
}

impl Record for EcgResp {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = vec![
            ("hr", self.heart_rate.into()),
            ("hr_valid", self.heart_rate.is_some().into()),
            ("resp", self.resp_rate.into()),
            ("resp_valid", self.resp_rate.is_some().into()),
        ];
        self.hr_alarm
            .push_values(&mut out, ["alarm/hr_max", "alarm/hr_min", "alarm/hr_set"]);
        self.resp_alarm
            .push_values(&mut out, ["alarm/resp_max", "alarm/resp_min", "alarm/resp_set"]);
        self.pvc_alarm
            .push_values(&mut out, ["alarm/pvc_max", "alarm/pvc_min", "alarm/pvc_set"]);
        out
    }

    fn waveforms(&self) -> Vec<(&'static str, &[u8])> {
        vec![
            ("ecg1", self.ecg1.as_slice()),
            ("ecg2", self.ecg2.as_slice()),
            ("ecg3", self.ecg3.as_slice()),
            ("resp", self.resp_wave.as_slice()),
        ]
    }

    fn unknown(&self) -> Vec<(&'static str, UnknownField)> {
        let mut out: Vec<_> = UNKNOWN_FLOAT_NAMES
            .iter()
            .zip(self.unknown_floats)
            .map(|(name, v)| (*name, UnknownField::Float(v)))
            .collect();
        out.push(("unk_394", UnknownField::Bytes(self.unknown_394.clone())));
        for (names, group) in UNKNOWN_GROUP_NAMES.iter().zip(&self.unknown_groups) {
            out.push((names[0], UnknownField::Float(group.a)));
            out.push((names[1], UnknownField::Float(group.b)));
            out.push((names[2], UnknownField::Word(group.word)));
        }
        out
    }
}
