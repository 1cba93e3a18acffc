//! Field tags, wire types and wire-type dispatch.
//!
//! Every field on the wire starts with a varint tag packing the field number
//! and a 3-bit wire type:
//!
//! ```text
//! tag = (field_number << 3) | wire_type
//! ```

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest field number allowed by the Protocol Buffers language (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// How the bytes following a tag are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`, `bool`, enums.
    Varint = 0,
    /// `fixed64`, `sfixed64`, `double`.
    Fixed64 = 1,
    /// Strings, bytes, embedded messages, packed repeated fields.
    LengthDelimited = 2,
    /// Deprecated group start. Recognized in tags, never read.
    StartGroup = 3,
    /// Deprecated group end. Recognized in tags, never read.
    EndGroup = 4,
    /// `fixed32`, `sfixed32`, `float`.
    Fixed32 = 5,
}

impl WireType {
    /// Returns whether repeated fields of this wire type may be packed.
    pub fn is_packable(self) -> bool {
        matches!(
            self,
            WireType::Varint | WireType::Fixed64 | WireType::Fixed32
        )
    }
}

impl TryFrom<u8> for WireType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(CodecError::UnsupportedWireType(value)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Varint => write!(f, "varint"),
            WireType::Fixed64 => write!(f, "fixed64"),
            WireType::LengthDelimited => write!(f, "length-delimited"),
            WireType::StartGroup => write!(f, "start-group"),
            WireType::EndGroup => write!(f, "end-group"),
            WireType::Fixed32 => write!(f, "fixed32"),
        }
    }
}

/// A decoded field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    field_number: u32,
    wire_type: WireType,
}

impl Tag {
    /// Creates a tag, validating the field number range.
    pub fn new(field_number: u32, wire_type: WireType) -> Result<Self, CodecError> {
        if field_number == 0 || field_number > MAX_FIELD_NUMBER {
            return Err(CodecError::InvalidTag(
                (u64::from(field_number) << 3) | wire_type as u64,
            ));
        }
        Ok(Self {
            field_number,
            wire_type,
        })
    }

    /// Parses a raw tag value as read from the wire.
    pub fn from_raw(raw: u64) -> Result<Self, CodecError> {
        if raw > u64::from(u32::MAX) {
            return Err(CodecError::InvalidTag(raw));
        }
        let wire_type = WireType::try_from((raw & 0x7) as u8)?;
        let field_number = (raw >> 3) as u32;
        if field_number == 0 {
            return Err(CodecError::InvalidTag(raw));
        }
        Ok(Self {
            field_number,
            wire_type,
        })
    }

    /// Returns the packed `(field_number << 3) | wire_type` value.
    pub fn to_raw(self) -> u32 {
        (self.field_number << 3) | self.wire_type as u32
    }

    pub fn field_number(self) -> u32 {
        self.field_number
    }

    pub fn wire_type(self) -> WireType {
        self.wire_type
    }
}

/// What to do when a known field arrives with an unexpected wire type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireTypePolicy {
    /// Fail with [`CodecError::WireTypeMismatch`].
    #[default]
    Strict,
    /// Skip the field using its actual wire type.
    Lenient,
}

/// Outcome of checking a tag against the wire type a schema declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Read a single value of the declared type.
    Read,
    /// Read a packed block of values of the declared type.
    ReadPacked,
    /// Skip the field.
    Skip,
}

/// Decides how a recognized field number is read.
///
/// `expected` is the wire type the schema declares for the field and
/// `packable` whether the field is a repeated scalar that may arrive packed.
pub fn dispatch(
    tag: Tag,
    expected: WireType,
    packable: bool,
    policy: WireTypePolicy,
) -> Result<Dispatch, CodecError> {
    let actual = tag.wire_type();
    if actual == expected {
        return Ok(Dispatch::Read);
    }
    if packable && expected.is_packable() && actual == WireType::LengthDelimited {
        return Ok(Dispatch::ReadPacked);
    }

    match policy {
        WireTypePolicy::Strict => Err(CodecError::WireTypeMismatch {
            field: tag.field_number(),
            expected,
            actual,
        }),
        WireTypePolicy::Lenient => {
            tracing::debug!(
                "Skipping field {} with wire type {} (expected {})",
                tag.field_number(),
                actual,
                expected
            );
            Ok(Dispatch::Skip)
        }
    }
}
