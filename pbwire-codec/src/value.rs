//! Schema-less field access.

use crate::error::CodecError;
use crate::reader::Reader;
use crate::wire::{Tag, WireType};

/// Wire-level value of a single field, borrowed from the input buffer.
///
/// See <https://protobuf.dev/programming-guides/encoding/#structure>.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Integer value encoded as a varint.
    Varint(u64),
    /// 64-bit fixed-width value.
    Fixed64(u64),
    /// Bytes of a string, `bytes` field, embedded message or packed block.
    LengthDelimited(&'a [u8]),
    /// 32-bit fixed-width value.
    Fixed32(u32),
}

impl FieldValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::Fixed64(_) => WireType::Fixed64,
            FieldValue::LengthDelimited(_) => WireType::LengthDelimited,
            FieldValue::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// Iterator over the raw fields of a message.
///
/// Yields `(tag, value)` pairs until the reader's end boundary. After the
/// first error the iterator is exhausted.
///
/// ```
/// use pbwire_codec::{FieldValue, Reader};
///
/// let buf = [0x08, 0x96, 0x01];
/// let mut reader = Reader::new(&buf);
/// let fields: Vec<_> = reader.fields().collect::<Result<_, _>>().unwrap();
/// assert_eq!(fields[0].0.field_number(), 1);
/// assert_eq!(fields[0].1, FieldValue::Varint(150));
/// ```
pub struct Fields<'r, 'a> {
    reader: &'r mut Reader<'a>,
    failed: bool,
}

impl<'r, 'a> Fields<'r, 'a> {
    pub(crate) fn new(reader: &'r mut Reader<'a>) -> Self {
        Self {
            reader,
            failed: false,
        }
    }

    fn read_field(&mut self) -> Result<(Tag, FieldValue<'a>), CodecError> {
        let tag = self.reader.read_tag()?;
        let value = self.reader.read_value(tag.wire_type())?;
        Ok((tag, value))
    }
}

impl<'a> Iterator for Fields<'_, 'a> {
    type Item = Result<(Tag, FieldValue<'a>), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.reader.remaining() {
            return None;
        }
        let result = self.read_field();
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Writer;

    #[test]
    fn test_iter_fields() {
        let mut writer = Writer::new();
        writer.write_tag(1, WireType::Varint).write_varint(1234);
        writer.write_tag(2, WireType::Fixed32).write_fixed32(456);
        writer.write_tag(3, WireType::LengthDelimited).write_bytes(&[1, 2, 3, 4]);
        writer.write_tag(4, WireType::Fixed64).write_fixed64(678);
        let buf = writer.finish().unwrap();

        let mut reader = Reader::new(&buf);
        let fields: Vec<_> = reader
            .fields()
            .map(|field| field.map(|(tag, value)| (tag.field_number(), value)))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            fields,
            [
                (1, FieldValue::Varint(1234)),
                (2, FieldValue::Fixed32(456)),
                (3, FieldValue::LengthDelimited(&[1, 2, 3, 4])),
                (4, FieldValue::Fixed64(678)),
            ]
        );
        assert!(!reader.remaining());
    }

    #[test]
    fn test_wire_types() {
        assert_eq!(FieldValue::Varint(0).wire_type(), WireType::Varint);
        assert_eq!(FieldValue::Fixed64(0).wire_type(), WireType::Fixed64);
        assert_eq!(
            FieldValue::LengthDelimited(&[]).wire_type(),
            WireType::LengthDelimited
        );
        assert_eq!(FieldValue::Fixed32(0).wire_type(), WireType::Fixed32);
    }

    #[test]
    fn test_stops_after_error() {
        // Field 1 varint, then a start-group tag.
        let buf = [0x08, 0x01, 0x13, 0x08, 0x02];
        let mut reader = Reader::new(&buf);
        let mut fields = reader.fields();

        assert!(fields.next().unwrap().is_ok());
        assert_eq!(
            fields.next().unwrap(),
            Err(CodecError::UnsupportedWireType(3))
        );
        assert!(fields.next().is_none());
    }

    #[test]
    fn test_empty_message() {
        let mut reader = Reader::new(&[]);
        assert!(reader.fields().next().is_none());
    }
}
