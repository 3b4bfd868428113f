use super::{layout, read_u16_triple};
use crate::codec::{FieldError, FieldReader};
use crate::record::{AlarmLimits, FieldValue, Record};

/// Pulse oximetry with its plethysmogram (lead 0x15).
#[derive(Debug, Clone, PartialEq)]
pub struct Spo2Pleth {
    pub pleth: Vec<u8>,
    pub spo2: Option<u8>,
    pub pulse_rate: Option<u8>,
    /// Sensor attached to the patient.
    pub attached: bool,
    pub spo2_alarm: AlarmLimits,
    pub pulse_alarm: AlarmLimits,
}

impl Spo2Pleth {
    /// Whether the monitor flagged the SpO2/pulse pair as valid.
    pub fn is_valid(&self) -> bool {
        self.spo2.is_some()
    }
}

pub fn parse_spo2_pleth(reader: &FieldReader<'_>) -> Result<Spo2Pleth, FieldError> {
    let pleth = reader.read_slice(layout::PLETH_RANGE)?.to_vec();
    let spo2 = reader.read_u8(layout::SPO2_OFFSET)?;
    let attached = reader.read_flag(layout::SPO2_ATTACHED_OFFSET)?;
    let pulse_rate = reader.read_u8(layout::SPO2_HR_OFFSET)?;
    let valid = reader.read_validity(
        layout::SPO2_VALID_OFFSET,
        &[layout::SPO2_OFFSET, layout::SPO2_HR_OFFSET],
    )?;

    // Wire order is min, max, set.
    let [min, max, set] = read_u16_triple(reader, layout::SPO2_ALARM_RANGE)?;
    let spo2_alarm = AlarmLimits { max, min, set };
    let [min, max, set] = read_u16_triple(reader, layout::SPO2_HR_ALARM_RANGE)?;
    let pulse_alarm = AlarmLimits { max, min, set };
    reader.require_zero_tail(layout::SPO2_TRAILER_OFFSET)?;

    Ok(Spo2Pleth {
        pleth,
        spo2: valid.then_some(spo2),
        pulse_rate: valid.then_some(pulse_rate),
        attached,
        spo2_alarm,
        pulse_alarm,
    })
}

impl Record for Spo2Pleth {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = vec![
            ("spo2", self.spo2.into()),
            ("spo2_attached", self.attached.into()),
            ("spo2_hr", self.pulse_rate.into()),
            ("spo2_valid", self.is_valid().into()),
        ];
        self.spo2_alarm
            .push_values(&mut out, ["alarm/spo2_max", "alarm/spo2_min", "alarm/spo2_set"]);
        self.pulse_alarm.push_values(
            &mut out,
            ["alarm/spo2_hr_max", "alarm/spo2_hr_min", "alarm/spo2_hr_set"],
        );
        out
    }

    fn waveforms(&self) -> Vec<(&'static str, &[u8])> {
        vec![("pleth", self.pleth.as_slice())]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::parse_spo2_pleth;
    use crate::blocks::telemetry::layout;
    use crate::codec::{FieldError, FieldReader};
    use crate::config::DecodeConfig;
    use crate::record::{FieldValue, Record};

    /// Full telemetry payload (header included) for lead 0x15.
    pub(crate) fn sample_payload(spo2: u8, attached: u8, hr: u8, valid: u8) -> Vec<u8> {
        let mut payload = vec![0u8; 0x118];
        payload[layout::LEAD_OFFSET] = layout::LEAD_SPO2_PLETH;
        payload[layout::PLETH_RANGE].fill(0x33);
        payload[layout::SPO2_OFFSET] = spo2;
        payload[layout::SPO2_ATTACHED_OFFSET] = attached;
        payload[layout::SPO2_HR_OFFSET] = hr;
        payload[layout::SPO2_VALID_OFFSET] = valid;
        for (idx, word) in [90u16, 100, 1, 50, 120, 1].iter().enumerate() {
            let at = layout::SPO2_ALARM_RANGE.start + idx * 2;
            payload[at..at + 2].copy_from_slice(&word.to_le_bytes());
        }
        payload
    }

    fn parse(payload: &[u8]) -> Result<super::Spo2Pleth, FieldError> {
        parse_spo2_pleth(&FieldReader::new(payload, 0x46, DecodeConfig::default()))
    }

    #[test]
    fn present_values() {
        let spo2 = parse(&sample_payload(98, 0, 80, 0)).unwrap();
        assert_eq!(spo2.spo2, Some(98));
        assert_eq!(spo2.pulse_rate, Some(80));
        assert!(spo2.attached);
        assert!(spo2.is_valid());
        assert_eq!(spo2.pleth.len(), 256);

        let values = spo2.values();
        assert!(values.contains(&("spo2", FieldValue::Int(98))));
        assert!(values.contains(&("spo2_attached", FieldValue::Bool(true))));
        assert!(values.contains(&("spo2_hr", FieldValue::Int(80))));
        assert!(values.contains(&("spo2_valid", FieldValue::Bool(true))));
    }

    #[test]
    fn alarms_are_min_max_set_on_the_wire() {
        let spo2 = parse(&sample_payload(98, 0, 80, 0)).unwrap();
        assert_eq!((spo2.spo2_alarm.min, spo2.spo2_alarm.max, spo2.spo2_alarm.set), (90, 100, 1));
        assert_eq!((spo2.pulse_alarm.min, spo2.pulse_alarm.max), (50, 120));
    }

    #[test]
    fn invalid_pair_is_absent() {
        let spo2 = parse(&sample_payload(0xFF, 0xFF, 0xFF, 0xFF)).unwrap();
        assert_eq!(spo2.spo2, None);
        assert_eq!(spo2.pulse_rate, None);
        assert!(!spo2.attached);
        assert!(spo2.values().contains(&("spo2", FieldValue::Absent)));
    }

    #[test]
    fn invalid_flag_with_live_value_is_bad_sentinel() {
        let err = parse(&sample_payload(98, 0, 0xFF, 0xFF)).unwrap_err();
        assert_eq!(
            err,
            FieldError::BadSentinel {
                offset: layout::SPO2_OFFSET,
                flag: 0xFF,
                value: 98
            }
        );

        let err = parse(&sample_payload(0xFF, 0, 80, 0xFF)).unwrap_err();
        assert!(matches!(
            err,
            FieldError::BadSentinel { offset, value: 80, .. } if offset == layout::SPO2_HR_OFFSET
        ));
    }

    #[test]
    fn flag_outside_zero_and_ff() {
        assert!(matches!(
            parse(&sample_payload(98, 0, 80, 0x01)),
            Err(FieldError::BadSentinel { flag: 0x01, .. })
        ));
        assert!(matches!(
            parse(&sample_payload(98, 0x02, 80, 0)),
            Err(FieldError::BadSentinel { flag: 0x02, .. })
        ));
    }
}
