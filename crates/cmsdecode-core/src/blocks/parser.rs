use tracing::trace;

use super::error::DecodeError;
use super::layout;
use super::{Block, RawBlock, SyncKind};
use crate::codec::{FieldError, FieldReader};
use crate::config::DecodeConfig;
use crate::frame::Frame;

/// Decode one block payload with the default (strict) configuration.
///
/// Type codes without a known layout come back as `Block::Raw`, never as an
/// error.
///
/// # Examples
/// ```
/// use cmsdecode_core::{Block, decode_block};
///
/// let block = decode_block(0x45, &[0x00, 0x00, 0x07, 0xFF])?;
/// assert!(matches!(block, Block::BedAssign(ref bed) if bed.bed == 7));
///
/// let raw = decode_block(0x99, &[0x01, 0x02])?;
/// assert_eq!(raw.block_type(), 0x99);
/// # Ok::<(), cmsdecode_core::DecodeError>(())
/// ```
pub fn decode_block(block_type: u8, payload: &[u8]) -> Result<Block, DecodeError> {
    decode_block_with(block_type, payload, &DecodeConfig::default())
}

pub fn decode_block_with(
    block_type: u8,
    payload: &[u8],
    config: &DecodeConfig,
) -> Result<Block, DecodeError> {
    let reader = FieldReader::new(payload, block_type, *config);
    let block = dispatch(block_type, &reader)
        .map_err(|kind| DecodeError::new(block_type, payload, kind))?;
    trace!(block_type, block = block.name(), "block decoded");
    Ok(block)
}

/// Decode the block carried by an already framed payload.
pub fn decode_frame_block(frame: &Frame) -> Result<Block, DecodeError> {
    decode_frame_block_with(frame, &DecodeConfig::default())
}

pub fn decode_frame_block_with(frame: &Frame, config: &DecodeConfig) -> Result<Block, DecodeError> {
    decode_block_with(frame.block_type, &frame.payload, config)
}

fn dispatch(block_type: u8, reader: &FieldReader<'_>) -> Result<Block, FieldError> {
    match block_type {
        layout::PATIENT_INFO => Ok(Block::PatientInfo(super::patient::parse_patient_info(
            reader,
        )?)),
        layout::SYNC_MARKER => parse_sync(reader, SyncKind::Marker43),
        layout::END_OF_CYCLE => parse_sync(reader, SyncKind::EndOfCycle),
        layout::BED_ASSIGN => Ok(Block::BedAssign(super::bed::parse_bed_assign(reader)?)),
        layout::TELEMETRY => Ok(Block::Telemetry(super::telemetry::parse_telemetry(
            reader,
        )?)),
        layout::ERROR_NOTICE => Ok(Block::ErrorNotice(super::notice::parse_error_notice(
            reader,
        )?)),
        other => Ok(Block::Raw(RawBlock {
            block_type: other,
            payload: reader.read_tail(0)?.to_vec(),
        })),
    }
}

fn parse_sync(reader: &FieldReader<'_>, kind: SyncKind) -> Result<Block, FieldError> {
    reader.require_exact_len(0)?;
    Ok(Block::SyncMarker { kind })
}

#[cfg(test)]
mod tests {
    use super::{decode_block, decode_block_with, decode_frame_block};
    use crate::blocks::{Block, RawBlock, SyncKind};
    use crate::codec::FieldError;
    use crate::config::DecodeConfig;
    use crate::frame::read_frame_from_bytes;

    #[test]
    fn sync_marker_from_wire() {
        let frame = read_frame_from_bytes(&[0x02, 0x00, 0x05, 0x47], 0).unwrap();
        assert_eq!(
            decode_frame_block(&frame).unwrap(),
            Block::SyncMarker {
                kind: SyncKind::EndOfCycle
            }
        );
        assert_eq!(
            decode_block(0x43, &[]).unwrap(),
            Block::SyncMarker {
                kind: SyncKind::Marker43
            }
        );
    }

    #[test]
    fn sync_marker_with_payload_is_rejected() {
        let err = decode_block(0x47, &[0x00]).unwrap_err();
        assert_eq!(err.block_type, 0x47);
        assert_eq!(
            err.kind,
            FieldError::UnexpectedLength {
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn error_notice_from_wire() {
        let frame = read_frame_from_bytes(&[0x06, 0x00, 0x05, 0x49, 0x2A, 0x45, 0x52], 0);
        // Declared length 6 needs four payload bytes; the wire only has three.
        assert!(frame.is_err());

        let frame = read_frame_from_bytes(&[0x05, 0x00, 0x05, 0x49, 0x2A, 0x45, 0x52], 0).unwrap();
        match decode_frame_block(&frame).unwrap() {
            Block::ErrorNotice(notice) => {
                assert_eq!(notice.code, 0x2A);
                assert_eq!(notice.message, "ER");
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn bed_assign_from_wire() {
        let frame =
            read_frame_from_bytes(&[0x06, 0x00, 0x05, 0x45, 0x00, 0x00, 0x07, 0xFF], 0).unwrap();
        match decode_frame_block(&frame).unwrap() {
            Block::BedAssign(bed) => assert_eq!(bed.bed, 7),
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_raw() {
        let block = decode_block(0x99, &[1, 2, 3]).unwrap();
        assert_eq!(
            block,
            Block::Raw(RawBlock {
                block_type: 0x99,
                payload: vec![1, 2, 3]
            })
        );
        assert_eq!(decode_block(0x00, &[]).unwrap().block_type(), 0x00);
    }

    #[test]
    fn decode_error_keeps_raw_payload() {
        let mut payload = crate::blocks::patient::tests::sample_payload();
        payload[0x20] = 0x01;
        let err = decode_block(0x3E, &payload).unwrap_err();
        assert_eq!(
            err.kind,
            FieldError::ReservedNonZero {
                offset: 0x20,
                value: 0x01
            }
        );
        assert_eq!(err.offset(), Some(0x20));
        assert_eq!(err.payload, payload);
        assert_eq!(err.declared_length as usize, payload.len() + 2);
    }

    #[test]
    fn lenient_config_tolerates_reserved_bytes() {
        let mut payload = crate::blocks::patient::tests::sample_payload();
        payload[0x20] = 0x01;
        let block = decode_block_with(0x3E, &payload, &DecodeConfig::lenient()).unwrap();
        assert_eq!(block.name(), "patient_info");
    }

    #[test]
    fn spo2_telemetry_present_values() {
        let payload = crate::blocks::telemetry::spo2::tests::sample_payload(98, 0, 80, 0);
        let block = decode_block(0x46, &payload).unwrap();
        let Block::Telemetry(telemetry) = block else {
            panic!("expected telemetry");
        };
        let crate::blocks::telemetry::Lead::Spo2Pleth(spo2) = telemetry.data else {
            panic!("expected spo2 lead");
        };
        assert_eq!(spo2.spo2, Some(98));
        assert!(spo2.attached);
        assert_eq!(spo2.pulse_rate, Some(80));
        assert!(spo2.is_valid());
    }

    #[test]
    fn spo2_telemetry_bad_sentinel() {
        let payload = crate::blocks::telemetry::spo2::tests::sample_payload(98, 0, 80, 0xFF);
        let err = decode_block(0x46, &payload).unwrap_err();
        assert!(matches!(err.kind, FieldError::BadSentinel { .. }));
        assert_eq!(err.block_type, 0x46);
    }
}
