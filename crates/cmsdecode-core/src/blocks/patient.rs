use time::Date;

use super::layout;
use crate::codec::{FieldError, FieldReader};
use crate::record::{FieldValue, Record, UnknownField};

/// Patient demographics (block 0x3E).
#[derive(Debug, Clone, PartialEq)]
pub struct PatientInfo {
    pub department: String,
    pub bed: u8,
    pub patient_name: String,
    pub patient_number: String,
    pub admit_date: Date,
    pub height_m: f64,
    pub weight_kg: f64,
    pub birth_date: Date,
    pub blood_type: u8,
    pub doctor_name: String,
    pub unknown_78: [u8; 4],
    pub unknown_8b: u8,
}

pub fn parse_patient_info(reader: &FieldReader<'_>) -> Result<PatientInfo, FieldError> {
    reader.require_len(layout::PATIENT_MIN_LEN)?;

    let department = reader.read_ascii_string(layout::PATIENT_DEPARTMENT_RANGE)?;
    reader.require_zero(layout::PATIENT_RESERVED_1_RANGE)?;
    let bed = reader.read_u8(layout::PATIENT_BED_OFFSET)?;
    let patient_name = reader.read_ascii_string(layout::PATIENT_NAME_RANGE)?;
    let patient_number = reader.read_ascii_string(layout::PATIENT_NUMBER_RANGE)?;
    let admit_date = reader.read_ascii_date(
        layout::PATIENT_ADMIT_YEAR_RANGE,
        layout::PATIENT_ADMIT_MONTH_RANGE,
        layout::PATIENT_ADMIT_DAY_RANGE,
    )?;
    reader.require_zero(layout::PATIENT_RESERVED_2_RANGE)?;
    let height = reader.read_u16_le(layout::PATIENT_HEIGHT_RANGE)?;
    let weight = reader.read_u16_le(layout::PATIENT_WEIGHT_RANGE)?;

    let mut unknown_78 = [0u8; 4];
    unknown_78.copy_from_slice(reader.read_slice(layout::PATIENT_UNKNOWN_78_RANGE)?);

    let birth_date = reader.read_ascii_date(
        layout::PATIENT_BIRTH_YEAR_RANGE,
        layout::PATIENT_BIRTH_MONTH_RANGE,
        layout::PATIENT_BIRTH_DAY_RANGE,
    )?;
    reader.require_zero(layout::PATIENT_RESERVED_3_RANGE)?;
    let unknown_8b = reader.read_u8(layout::PATIENT_UNKNOWN_8B_OFFSET)?;
    let blood_type = reader.read_u8(layout::PATIENT_BLOOD_TYPE_OFFSET)?;
    let doctor_name = reader.read_ascii_string(layout::PATIENT_DOCTOR_RANGE)?;
    reader.require_zero_tail(layout::PATIENT_TRAILER_OFFSET)?;

    Ok(PatientInfo {
        department,
        bed,
        patient_name,
        patient_number,
        admit_date,
        height_m: f64::from(height) / layout::HEIGHT_SCALE,
        weight_kg: f64::from(weight) / layout::WEIGHT_SCALE,
        birth_date,
        blood_type,
        doctor_name,
        unknown_78,
        unknown_8b,
    })
}

impl Record for PatientInfo {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("department", self.department.as_str().into()),
            ("bed", self.bed.into()),
            ("patient_name", self.patient_name.as_str().into()),
            ("patient_number", self.patient_number.as_str().into()),
            ("admit_date", self.admit_date.into()),
            ("height_m", self.height_m.into()),
            ("weight_kg", self.weight_kg.into()),
            ("birth_date", self.birth_date.into()),
            ("blood_type", self.blood_type.into()),
            ("doctor_name", self.doctor_name.as_str().into()),
        ]
    }

    fn unknown(&self) -> Vec<(&'static str, UnknownField)> {
        vec![
            ("unk_78", UnknownField::Bytes(self.unknown_78.to_vec())),
            ("unk_8b", UnknownField::Bytes(vec![self.unknown_8b])),
        ]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::parse_patient_info;
    use crate::blocks::layout;
    use crate::codec::{FieldError, FieldReader};
    use crate::config::DecodeConfig;

    fn put_str(payload: &mut [u8], range: std::ops::Range<usize>, text: &str) {
        payload[range.start..range.start + text.len()].copy_from_slice(text.as_bytes());
    }

    pub(crate) fn sample_payload() -> Vec<u8> {
        let mut payload = vec![0u8; 0xB0];
        put_str(&mut payload, layout::PATIENT_DEPARTMENT_RANGE, "CCU");
        payload[layout::PATIENT_BED_OFFSET] = 12;
        put_str(&mut payload, layout::PATIENT_NAME_RANGE, "ZHANG SAN");
        put_str(&mut payload, layout::PATIENT_NUMBER_RANGE, "P-0042");
        put_str(&mut payload, layout::PATIENT_ADMIT_YEAR_RANGE, "2019");
        put_str(&mut payload, layout::PATIENT_ADMIT_MONTH_RANGE, "11");
        put_str(&mut payload, layout::PATIENT_ADMIT_DAY_RANGE, "3");
        payload[layout::PATIENT_HEIGHT_RANGE].copy_from_slice(&1725u16.to_le_bytes());
        payload[layout::PATIENT_WEIGHT_RANGE].copy_from_slice(&683u16.to_le_bytes());
        payload[layout::PATIENT_UNKNOWN_78_RANGE].copy_from_slice(&[1, 2, 3, 4]);
        put_str(&mut payload, layout::PATIENT_BIRTH_YEAR_RANGE, "1956");
        put_str(&mut payload, layout::PATIENT_BIRTH_MONTH_RANGE, "02");
        put_str(&mut payload, layout::PATIENT_BIRTH_DAY_RANGE, "29");
        payload[layout::PATIENT_BLOOD_TYPE_OFFSET] = 2;
        put_str(&mut payload, layout::PATIENT_DOCTOR_RANGE, "DR LI");
        payload
    }

    fn parse(payload: &[u8]) -> Result<super::PatientInfo, FieldError> {
        parse_patient_info(&FieldReader::new(payload, 0x3E, DecodeConfig::default()))
    }

    #[test]
    fn parse_valid_patient_info() {
        let info = parse(&sample_payload()).unwrap();
        assert_eq!(info.department, "CCU");
        assert_eq!(info.bed, 12);
        assert_eq!(info.patient_name, "ZHANG SAN");
        assert_eq!(info.patient_number, "P-0042");
        assert_eq!(info.admit_date.to_string(), "2019-11-03");
        assert_eq!(info.birth_date.to_string(), "1956-02-29");
        assert!((info.height_m - 1.725).abs() < 1e-9);
        assert!((info.weight_kg - 68.3).abs() < 1e-9);
        assert_eq!(info.blood_type, 2);
        assert_eq!(info.doctor_name, "DR LI");
        assert_eq!(info.unknown_78, [1, 2, 3, 4]);
    }

    #[test]
    fn reserved_byte_after_department() {
        let mut payload = sample_payload();
        payload[0x20] = 0x01;
        assert_eq!(
            parse(&payload).unwrap_err(),
            FieldError::ReservedNonZero {
                offset: 0x20,
                value: 0x01
            }
        );
    }

    #[test]
    fn reserved_bytes_after_admit_date() {
        let mut payload = sample_payload();
        payload[0x6E] = 0x20;
        assert_eq!(
            parse(&payload).unwrap_err(),
            FieldError::ReservedNonZero {
                offset: 0x6E,
                value: 0x20
            }
        );

        let mut payload = sample_payload();
        payload[0x73] = 0x01;
        assert!(matches!(
            parse(&payload),
            Err(FieldError::ReservedNonZero { offset: 0x73, .. })
        ));
    }

    #[test]
    fn reserved_bytes_after_birth_date() {
        let mut payload = sample_payload();
        payload[0x87] = 0xFF;
        assert_eq!(
            parse(&payload).unwrap_err(),
            FieldError::ReservedNonZero {
                offset: 0x87,
                value: 0xFF
            }
        );
    }

    #[test]
    fn reserved_trailer_reports_first_offset() {
        let mut payload = sample_payload();
        payload[0xAE] = 0x10;
        payload[0xAF] = 0x20;
        assert!(matches!(
            parse(&payload),
            Err(FieldError::ReservedNonZero { offset: 0xAE, .. })
        ));
    }

    #[test]
    fn byte_between_reserved_and_blood_type_is_unconstrained() {
        let mut payload = sample_payload();
        payload[layout::PATIENT_UNKNOWN_8B_OFFSET] = 0x7F;
        assert_eq!(parse(&payload).unwrap().unknown_8b, 0x7F);
    }

    #[test]
    fn non_numeric_birth_year() {
        let mut payload = sample_payload();
        payload[layout::PATIENT_BIRTH_YEAR_RANGE.start] = b'X';
        assert!(matches!(
            parse(&payload),
            Err(FieldError::BadDate { offset: 0x7C, .. })
        ));
    }

    #[test]
    fn short_payload() {
        let payload = vec![0u8; layout::PATIENT_MIN_LEN - 1];
        assert!(matches!(
            parse(&payload),
            Err(FieldError::OutOfBounds { .. })
        ));
    }
}
