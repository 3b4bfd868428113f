use super::layout;
use crate::codec::{FieldError, FieldReader};
use crate::record::{FieldValue, Record};

/// Error notice sent by the monitor (block 0x49).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub code: u8,
    pub message: String,
}

pub fn parse_error_notice(reader: &FieldReader<'_>) -> Result<ErrorNotice, FieldError> {
    let code = reader.read_u8(layout::NOTICE_CODE_OFFSET)?;
    let message = reader.read_tail(layout::NOTICE_MESSAGE_OFFSET)?;
    Ok(ErrorNotice {
        code,
        message: String::from_utf8_lossy(message).into_owned(),
    })
}

impl Record for ErrorNotice {
    fn values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("error_code", self.code.into()),
            ("error_message", self.message.as_str().into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::parse_error_notice;
    use crate::codec::{FieldError, FieldReader};
    use crate::config::DecodeConfig;

    fn parse(payload: &[u8]) -> Result<super::ErrorNotice, FieldError> {
        parse_error_notice(&FieldReader::new(payload, 0x49, DecodeConfig::default()))
    }

    #[test]
    fn code_and_message() {
        let notice = parse(&[0x2A, b'E', b'R']).unwrap();
        assert_eq!(notice.code, 0x2A);
        assert_eq!(notice.message, "ER");
    }

    #[test]
    fn code_only() {
        assert_eq!(parse(&[0x01]).unwrap().message, "");
    }

    #[test]
    fn empty_payload_is_out_of_bounds() {
        assert!(matches!(parse(&[]), Err(FieldError::OutOfBounds { needed: 1, actual: 0 })));
    }
}
