//! Conversion errors for the well-known types.

use pbwire_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    TimestampOutOfRange { seconds: i64, nanos: i32 },

    #[error("duration out of range")]
    DurationOutOfRange,

    #[error("type URL mismatch: expected {expected}, got {actual}")]
    TypeUrlMismatch { expected: String, actual: String },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TypeError::TimestampOutOfRange {
            seconds: 1,
            nanos: -5,
        };
        assert_eq!(err.to_string(), "timestamp out of range: 1s -5ns");

        let err = TypeError::TypeUrlMismatch {
            expected: "/google.protobuf.Timestamp".to_string(),
            actual: "/google.protobuf.Duration".to_string(),
        };
        assert!(err.to_string().contains("expected /google.protobuf.Timestamp"));
    }

    #[test]
    fn test_from_codec_error() {
        let err: TypeError = CodecError::MalformedVarint.into();
        assert_eq!(err, TypeError::Codec(CodecError::MalformedVarint));
    }
}
