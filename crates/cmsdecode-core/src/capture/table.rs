use std::io::Write;

use super::session::SessionState;
use super::ts_to_rfc3339;

pub const TIME_COLUMN: &str = "time";
pub const WAVE_PREFIX: &str = "wave/";
const ALARM_PREFIX: &str = "alarm/";

/// Writes one CSV row per completed telemetry cycle.
///
/// The header is fixed when the first row is written: `time`, the scalar
/// names known at that point (alarm limits excluded) and one `wave/<name>`
/// column per waveform. Values first seen later are not added.
pub struct CycleWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: Option<Columns>,
    rows: u64,
}

struct Columns {
    values: Vec<&'static str>,
    waveforms: Vec<&'static str>,
}

impl<W: Write> CycleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            columns: None,
            rows: 0,
        }
    }

    pub fn write_row(&mut self, state: &SessionState) -> Result<(), csv::Error> {
        if self.columns.is_none() {
            let columns = Columns {
                values: state
                    .value_names()
                    .filter(|name| !name.starts_with(ALARM_PREFIX))
                    .collect(),
                waveforms: state.waveform_names().collect(),
            };
            let mut header = vec![TIME_COLUMN.to_string()];
            header.extend(columns.values.iter().map(|name| name.to_string()));
            header.extend(
                columns
                    .waveforms
                    .iter()
                    .map(|name| format!("{WAVE_PREFIX}{name}")),
            );
            self.writer.write_record(&header)?;
            self.columns = Some(columns);
        }
        let Some(columns) = &self.columns else {
            return Ok(());
        };

        let mut record = vec![ts_to_rfc3339(state.time()).unwrap_or_default()];
        record.extend(columns.values.iter().map(|name| {
            state
                .value(name)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
        record.extend(columns.waveforms.iter().map(|name| {
            state
                .waveform(name)
                .map(join_samples)
                .unwrap_or_default()
        }));
        self.writer.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn join_samples(samples: &[u8]) -> String {
    samples
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::CycleWriter;
    use crate::blocks::decode_block;
    use crate::capture::session::SessionState;

    #[test]
    fn header_is_fixed_by_first_row() {
        let mut state = SessionState::new();
        state.set_time(Some(0.0));
        state.apply(&decode_block(0x45, &[0, 0, 3, 0xFF]).unwrap());

        let mut out = Vec::new();
        {
            let mut writer = CycleWriter::new(&mut out);
            writer.write_row(&state).unwrap();
            let spo2 = crate::blocks::telemetry::spo2::tests::sample_payload(98, 0, 80, 0);
            state.apply(&decode_block(0x46, &spo2).unwrap());
            writer.write_row(&state).unwrap();
            assert_eq!(writer.rows(), 2);
            writer.flush().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,bed");
        assert_eq!(lines[1], "1970-01-01T00:00:00Z,3");
        assert_eq!(lines[2], "1970-01-01T00:00:00Z,3");
    }

    #[test]
    fn alarms_excluded_and_waves_prefixed() {
        let mut state = SessionState::new();
        let spo2 = crate::blocks::telemetry::spo2::tests::sample_payload(98, 0, 80, 0);
        state.apply(&decode_block(0x46, &spo2).unwrap());

        let mut out = Vec::new();
        {
            let mut writer = CycleWriter::new(&mut out);
            writer.write_row(&state).unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "time,spo2,spo2_attached,spo2_hr,spo2_valid,wave/pleth"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(",98,true,80,true,51 51 "));
    }
}
