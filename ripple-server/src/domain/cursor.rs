use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};

use super::error::DomainError;

/// Opaque pagination cursor: base64 of the decimal microsecond timestamp.
/// Clients never interpret it; the paginator only compares decoded values.
///
/// Microseconds match timestamptz precision, so every timestamp read back
/// from storage round-trips exactly.
pub(crate) fn encode_cursor(timestamp: DateTime<Utc>) -> String {
    URL_SAFE_NO_PAD.encode(timestamp.timestamp_micros().to_string())
}

pub(crate) fn decode_cursor(cursor: &str) -> Result<DateTime<Utc>, DomainError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| DomainError::InvalidCursor)?;
    let text = String::from_utf8(bytes).map_err(|_| DomainError::InvalidCursor)?;
    let micros: i64 = text.parse().map_err(|_| DomainError::InvalidCursor)?;

    DateTime::from_timestamp_micros(micros).ok_or(DomainError::InvalidCursor)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::{decode_cursor, encode_cursor};
    use crate::domain::error::DomainError;

    #[test]
    fn cursor_round_trips() {
        let t = DateTime::from_timestamp_micros(1_700_000_000_123_456)
            .expect("timestamp must be valid");
        let decoded = decode_cursor(&encode_cursor(t)).expect("cursor must decode");
        assert_eq!(decoded, t);
    }

    #[test]
    fn cursor_round_trips_current_storage_precision() {
        // Storage truncates to microseconds; the codec must be exact there.
        let micros = Utc::now().timestamp_micros();
        let t = DateTime::from_timestamp_micros(micros).expect("timestamp must be valid");
        assert_eq!(
            decode_cursor(&encode_cursor(t)).expect("cursor must decode"),
            t
        );
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let err = decode_cursor("not base64!!").expect_err("must be rejected");
        assert!(matches!(err, DomainError::InvalidCursor));
    }

    #[test]
    fn decode_rejects_non_numeric_payload() {
        use base64::Engine as _;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let cursor = URL_SAFE_NO_PAD.encode("yesterday");
        let err = decode_cursor(&cursor).expect_err("must be rejected");
        assert!(matches!(err, DomainError::InvalidCursor));
    }

    #[test]
    fn decode_rejects_non_utf8_payload() {
        use base64::Engine as _;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let cursor = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        let err = decode_cursor(&cursor).expect_err("must be rejected");
        assert!(matches!(err, DomainError::InvalidCursor));
    }
}
