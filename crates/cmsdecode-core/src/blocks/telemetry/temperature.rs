use super::layout;
use crate::codec::{FieldError, FieldReader};
use crate::record::{FieldValue, Record};

/// Temperature alarm limits; thresholds are floats, the enable switch a word.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureAlarm {
    pub max: f32,
    pub min: f32,
    pub set: u16,
}

/// Two temperature probes and their difference (lead 0x17).
#[derive(Debug, Clone, PartialEq)]
pub struct Temperature {
    pub t1: f32,
    pub t2: f32,
    pub delta: f32,
    pub t1_alarm: TemperatureAlarm,
    pub t2_alarm: TemperatureAlarm,
    pub delta_alarm: TemperatureAlarm,
}

pub fn parse_temperature(reader: &FieldReader<'_>) -> Result<Temperature, FieldError> {
    let t1 = reader.read_f32_le(layout::T1_RANGE)?;
    let t2 = reader.read_f32_le(layout::T2_RANGE)?;
    let delta = reader.read_f32_le(layout::TD_RANGE)?;

    let mut alarms = [TemperatureAlarm::default(); 3];
    for (alarm, start) in alarms.iter_mut().zip(layout::TEMP_ALARM_STARTS) {
        *alarm = TemperatureAlarm {
            max: reader.read_f32_le(start..start + 4)?,
            min: reader.read_f32_le(start + 4..start + 8)?,
            set: reader.read_u16_le(start + 8..start + layout::TEMP_ALARM_LEN)?,
        };
    }
    reader.require_zero_tail(layout::TEMP_TRAILER_OFFSET)?;

    let [t1_alarm, t2_alarm, delta_alarm] = alarms;
    Ok(Temperature {
        t1,
        t2,
        delta,
        t1_alarm,
        t2_alarm,
        delta_alarm,
    })
}

impl Record for Temperature {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = vec![
            ("t1", self.t1.into()),
            ("t2", self.t2.into()),
            ("td", self.delta.into()),
        ];
        let channels = [
            (&self.t1_alarm, ["alarm/t1_max", "alarm/t1_min", "alarm/t1_set"]),
            (&self.t2_alarm, ["alarm/t2_max", "alarm/t2_min", "alarm/t2_set"]),
            (&self.delta_alarm, ["alarm/td_max", "alarm/td_min", "alarm/td_set"]),
        ];
        for (alarm, [max, min, set]) in channels {
            out.push((max, alarm.max.into()));
            out.push((min, alarm.min.into()));
            out.push((set, alarm.set.into()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::parse_temperature;
    use crate::blocks::telemetry::layout;
    use crate::codec::{FieldError, FieldReader};
    use crate::config::DecodeConfig;
    use crate::record::{FieldValue, Record};

    fn sample_payload() -> Vec<u8> {
        let mut payload = vec![0u8; layout::TEMP_TRAILER_OFFSET + 2];
        payload[layout::LEAD_OFFSET] = layout::LEAD_TEMPERATURE;
        payload[layout::T1_RANGE].copy_from_slice(&36.5f32.to_le_bytes());
        payload[layout::T2_RANGE].copy_from_slice(&35.25f32.to_le_bytes());
        payload[layout::TD_RANGE].copy_from_slice(&1.25f32.to_le_bytes());
        let start = layout::TEMP_ALARM_STARTS[1];
        payload[start..start + 4].copy_from_slice(&39.0f32.to_le_bytes());
        payload[start + 4..start + 8].copy_from_slice(&35.0f32.to_le_bytes());
        payload[start + 8..start + 10].copy_from_slice(&1u16.to_le_bytes());
        payload
    }

    fn parse(payload: &[u8]) -> Result<super::Temperature, FieldError> {
        parse_temperature(&FieldReader::new(payload, 0x46, DecodeConfig::default()))
    }

    #[test]
    fn decodes_channels_and_alarms() {
        let temp = parse(&sample_payload()).unwrap();
        assert_eq!(temp.t1, 36.5);
        assert_eq!(temp.t2, 35.25);
        assert_eq!(temp.delta, 1.25);
        assert_eq!(temp.t2_alarm.max, 39.0);
        assert_eq!(temp.t2_alarm.min, 35.0);
        assert_eq!(temp.t2_alarm.set, 1);

        let values = temp.values();
        assert_eq!(values.len(), 12);
        assert!(values.contains(&("t1", FieldValue::Float(36.5))));
        assert!(values.contains(&("alarm/t2_set", FieldValue::Int(1))));
    }

    #[test]
    fn trailer_must_be_zero() {
        let mut payload = sample_payload();
        payload[layout::TEMP_TRAILER_OFFSET + 1] = 3;
        assert!(matches!(
            parse(&payload),
            Err(FieldError::ReservedNonZero { offset: 0x2F, value: 3 })
        ));
    }
}
