//! Decoder for reader text lines.
//!
//! The reader emits one read per line:
//!
//! ```text
//! TAG,<signal_strength>,<frequency>,<device_timestamp>,<identifier>
//! ```
//!
//! Everything after the fourth comma is the identifier, commas included.
//! The device timestamp is carried along for diagnostics only; timing math
//! uses the local arrival time handed to the decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tw_common::TagId;

/// Literal first field of every reading line.
pub const READING_PREFIX: &str = "TAG";

/// Number of comma-separated fields in a reading line.
pub const READING_FIELDS: usize = 5;

/// One decoded observation of a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadEvent {
    pub tag_id: TagId,
    /// Local arrival time; the clock all interval math runs on.
    pub observed_at: DateTime<Utc>,
    pub signal_strength: i64,
    pub frequency: i64,
    /// Reader-side timestamp field, `None` when it is not an integer.
    pub device_timestamp: Option<i64>,
}

/// Why a line is not a reading.
///
/// None of these are fatal: the line is skipped and the cycle carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("line does not start with the {READING_PREFIX} prefix")]
    MissingPrefix,

    #[error("expected {READING_FIELDS} fields, found {found}")]
    FieldCount { found: usize },

    #[error("field {field} is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
}

/// Decode raw line bytes as received from the line source.
pub fn decode(raw: &[u8], arrived_at: DateTime<Utc>) -> Result<ReadEvent, DecodeError> {
    let line = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
    decode_line(line, arrived_at)
}

/// Decode one text line.
///
/// Surrounding whitespace (including the line terminator) is ignored.
pub fn decode_line(line: &str, arrived_at: DateTime<Utc>) -> Result<ReadEvent, DecodeError> {
    let line = line.trim();
    let fields: Vec<&str> = line.splitn(READING_FIELDS, ',').collect();

    if fields[0] != READING_PREFIX {
        return Err(DecodeError::MissingPrefix);
    }
    if fields.len() != READING_FIELDS {
        return Err(DecodeError::FieldCount {
            found: fields.len(),
        });
    }

    let signal_strength = parse_int(fields[1], "signal_strength")?;
    let frequency = parse_int(fields[2], "frequency")?;
    let device_timestamp = fields[3].trim().parse::<i64>().ok();

    Ok(ReadEvent {
        tag_id: TagId::new(fields[4]),
        observed_at: arrived_at,
        signal_strength,
        frequency,
        device_timestamp,
    })
}

fn parse_int(value: &str, field: &'static str) -> Result<i64, DecodeError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn decodes_valid_line() {
        let event = decode_line("TAG,-40,915,1234567,ABC123", at()).unwrap();
        assert_eq!(event.tag_id, TagId::from("ABC123"));
        assert_eq!(event.signal_strength, -40);
        assert_eq!(event.frequency, 915);
        assert_eq!(event.device_timestamp, Some(1234567));
        assert_eq!(event.observed_at, at());
    }

    #[test]
    fn strips_line_terminator() {
        let event = decode(b"TAG,-52,902750,99,E2801160\r\n", at()).unwrap();
        assert_eq!(event.tag_id.as_str(), "E2801160");
        assert_eq!(event.frequency, 902750);
    }

    #[test]
    fn identifier_keeps_embedded_commas() {
        let event = decode_line("TAG,-40,915,1,E200,3412,DC03", at()).unwrap();
        assert_eq!(event.tag_id.as_str(), "E200,3412,DC03");
    }

    #[test]
    fn device_timestamp_is_advisory() {
        let event = decode_line("TAG,-40,915,not-a-clock,ABC", at()).unwrap();
        assert_eq!(event.device_timestamp, None);
        assert_eq!(event.observed_at, at());
    }

    #[test]
    fn uses_arrival_time_not_device_time() {
        let later = at() + chrono::Duration::seconds(30);
        let event = decode_line("TAG,-40,915,0,ABC", later).unwrap();
        assert_eq!(event.observed_at, later);
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert_eq!(
            decode_line("GARBAGE,1,2,3", at()),
            Err(DecodeError::MissingPrefix)
        );
        assert_eq!(
            decode_line("TAGS,-40,915,1,ABC", at()),
            Err(DecodeError::MissingPrefix)
        );
        assert_eq!(decode_line("", at()), Err(DecodeError::MissingPrefix));
    }

    #[test]
    fn rejects_short_lines() {
        assert_eq!(
            decode_line("TAG,-40,915,1", at()),
            Err(DecodeError::FieldCount { found: 4 })
        );
        assert_eq!(
            decode_line("TAG", at()),
            Err(DecodeError::FieldCount { found: 1 })
        );
    }

    #[test]
    fn rejects_non_integer_numeric_fields() {
        assert_eq!(
            decode_line("TAG,strong,915,1,ABC", at()),
            Err(DecodeError::InvalidInteger {
                field: "signal_strength",
                value: "strong".to_string()
            })
        );
        assert!(matches!(
            decode_line("TAG,-40,915.5,1,ABC", at()),
            Err(DecodeError::InvalidInteger {
                field: "frequency",
                ..
            })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(
            decode(&[b'T', b'A', b'G', b',', 0xff, 0xfe], at()),
            Err(DecodeError::InvalidUtf8)
        );
    }

    #[test]
    fn tolerates_padding_around_numbers() {
        let event = decode_line("TAG, -40 , 915 ,1,ABC", at()).unwrap();
        assert_eq!(event.signal_strength, -40);
        assert_eq!(event.frequency, 915);
    }
}
