//! Codec error types.

use crate::wire::WireType;
use thiserror::Error;

/// Errors raised while encoding or decoding Protocol Buffers wire data.
///
/// Decode errors are final for the message being decoded: the codec never
/// substitutes a default value for a field it failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed varint: exceeds 64 bits")]
    MalformedVarint,

    #[error("unexpected end of input: need {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("read of {requested} bytes overruns boundary at offset {limit} ({available} available)")]
    BufferOverrun {
        requested: usize,
        available: usize,
        limit: usize,
    },

    #[error("unsupported wire type: {0}")]
    UnsupportedWireType(u8),

    #[error("invalid field tag: {0:#x}")]
    InvalidTag(u64),

    #[error("length mismatch: declared end at offset {declared_end}, content ends at {actual_end}")]
    LengthMismatch {
        declared_end: usize,
        actual_end: usize,
    },

    #[error("ldelim called without an open fork")]
    ForkUnderflow,

    #[error("finish called with {open} unclosed fork(s)")]
    UnclosedFork { open: usize },

    #[error("message nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("invalid UTF-8 in string field: {0}")]
    Utf8Invalid(#[from] std::str::Utf8Error),

    #[error("field {field}: expected wire type {expected}, got {actual}")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        actual: WireType,
    },

    #[error("{message}.{field}: {source}")]
    Field {
        message: &'static str,
        field: u32,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Attaches the message type and field number being decoded.
    pub fn in_field(self, message: &'static str, field: u32) -> Self {
        CodecError::Field {
            message,
            field,
            source: Box::new(self),
        }
    }

    /// Returns the underlying error with any field context removed.
    pub fn kind(&self) -> &CodecError {
        match self {
            CodecError::Field { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Returns whether the input ended early or a declared length was wrong.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self.kind(),
            CodecError::UnexpectedEof { .. }
                | CodecError::BufferOverrun { .. }
                | CodecError::LengthMismatch { .. }
        )
    }

    /// Returns whether this error is caused by misusing the writer API
    /// rather than by bad input.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self.kind(),
            CodecError::ForkUnderflow | CodecError::UnclosedFork { .. }
        )
    }
}
