use time::{Date, Month, PrimitiveDateTime, Time};

use super::{layout, read_u16_triple};
use crate::codec::{FieldError, FieldReader};
use crate::record::{AlarmLimits, FieldValue, Record};

/// Non-invasive blood pressure, last measurement (lead 0x16).
#[derive(Debug, Clone, PartialEq)]
pub struct Nibp {
    pub measured_at: PrimitiveDateTime,
    pub systolic: u16,
    pub diastolic: u16,
    pub mean: u16,
    pub systolic_alarm: AlarmLimits,
    pub diastolic_alarm: AlarmLimits,
    pub mean_alarm: AlarmLimits,
}

pub fn parse_nibp(reader: &FieldReader<'_>) -> Result<Nibp, FieldError> {
    let measured_at = read_timestamp(reader)?;
    let systolic = reader.read_u16_le(layout::NIBP_SYS_RANGE)?;
    let diastolic = reader.read_u16_le(layout::NIBP_DIA_RANGE)?;
    let mean = reader.read_u16_le(layout::NIBP_MAP_RANGE)?;

    let [max, min, set] = read_u16_triple(reader, layout::NIBP_SYS_ALARM_RANGE)?;
    let systolic_alarm = AlarmLimits { max, min, set };
    let [max, min, set] = read_u16_triple(reader, layout::NIBP_DIA_ALARM_RANGE)?;
    let diastolic_alarm = AlarmLimits { max, min, set };
    let [max, min, set] = read_u16_triple(reader, layout::NIBP_MAP_ALARM_RANGE)?;
    let mean_alarm = AlarmLimits { max, min, set };
    reader.require_zero_tail(layout::NIBP_TRAILER_OFFSET)?;

    Ok(Nibp {
        measured_at,
        systolic,
        diastolic,
        mean,
        systolic_alarm,
        diastolic_alarm,
        mean_alarm,
    })
}

fn read_timestamp(reader: &FieldReader<'_>) -> Result<PrimitiveDateTime, FieldError> {
    let year = reader.read_u16_le(layout::NIBP_YEAR_RANGE)?;
    let month = reader.read_u8(layout::NIBP_MONTH_OFFSET)?;
    let day = reader.read_u8(layout::NIBP_DAY_OFFSET)?;
    let hour = reader.read_u8(layout::NIBP_HOUR_OFFSET)?;
    let minute = reader.read_u8(layout::NIBP_MINUTE_OFFSET)?;
    let second = reader.read_u8(layout::NIBP_SECOND_OFFSET)?;

    let date = Month::try_from(month)
        .ok()
        .and_then(|month| Date::from_calendar_date(i32::from(year), month, day).ok());
    let time = Time::from_hms(hour, minute, second).ok();
    match (date, time) {
        (Some(date), Some(time)) => Ok(PrimitiveDateTime::new(date, time)),
        _ => Err(FieldError::BadDate {
            offset: layout::NIBP_YEAR_RANGE.start,
            text: format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"),
        }),
    }
}

impl Record for Nibp {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut out = vec![
            ("nibp_time", self.measured_at.into()),
            ("nibp_sys", self.systolic.into()),
            ("nibp_dia", self.diastolic.into()),
            ("nibp_map", self.mean.into()),
        ];
        self.systolic_alarm.push_values(
            &mut out,
            ["alarm/bp_sys_max", "alarm/bp_sys_min", "alarm/bp_sys_set"],
        );
        self.diastolic_alarm.push_values(
            &mut out,
            ["alarm/bp_dia_max", "alarm/bp_dia_min", "alarm/bp_dia_set"],
        );
        self.mean_alarm.push_values(
            &mut out,
            ["alarm/bp_map_max", "alarm/bp_map_min", "alarm/bp_map_set"],
        );
        out
    }
}
