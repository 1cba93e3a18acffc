//! Append-only encoder with deferred-length embedded messages.
//!
//! The length prefix of an embedded message is only known once the message
//! has been written. [`Writer::fork`] starts a new frame on a stack of byte
//! accumulators, and [`Writer::ldelim`] closes it, writing the frame's length
//! and contents into its parent:
//!
//! ```text
//! write_tag(2, LEN)  fork()  ...child fields...  ldelim()
//!        |             |                            |
//!   parent: [.. 12]  push []                  parent: [.. 12 len child..]
//! ```
//!
//! Closed frames are kept and reused by later forks.

use crate::error::CodecError;
use crate::message::Message;
use crate::value::FieldValue;
use crate::varint::{encode_varint, zigzag_encode32, zigzag_encode64};
use crate::wire::{Tag, WireType, MAX_FIELD_NUMBER};
use bytes::{BufMut, Bytes, BytesMut};

/// Protocol Buffers encoder.
///
/// Scalar writes return `&mut Self` so calls can be chained:
///
/// ```
/// use pbwire_codec::{WireType, Writer};
///
/// let mut writer = Writer::new();
/// writer.write_tag(1, WireType::Varint).write_uint64(42);
/// writer.write_tag(2, WireType::LengthDelimited).write_string("ok");
/// let bytes = writer.finish().unwrap();
/// assert_eq!(&bytes[..], &[0x08, 0x2a, 0x12, 0x02, 0x6f, 0x6b]);
/// ```
#[derive(Debug, Default)]
pub struct Writer {
    root: BytesMut,
    forks: Vec<BytesMut>,
    spare: Vec<BytesMut>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            root: BytesMut::with_capacity(capacity),
            forks: Vec::new(),
            spare: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut BytesMut {
        self.forks.last_mut().unwrap_or(&mut self.root)
    }

    /// Number of bytes written to the innermost open frame.
    pub fn len(&self) -> usize {
        self.forks.last().unwrap_or(&self.root).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of forks not yet closed with [`ldelim`](Self::ldelim).
    pub fn depth(&self) -> usize {
        self.forks.len()
    }

    /// Writes a field tag.
    ///
    /// `field_number` must be in `1..=MAX_FIELD_NUMBER`. Debug builds panic
    /// otherwise and release builds write an invalid tag. Use
    /// [`try_write_tag`](Self::try_write_tag) for numbers that are not
    /// compile-time constants.
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) -> &mut Self {
        debug_assert!(
            (1..=MAX_FIELD_NUMBER).contains(&field_number),
            "field number {field_number} out of range"
        );
        self.write_varint((u64::from(field_number) << 3) | wire_type as u64)
    }

    /// Writes a field tag, failing with [`CodecError::InvalidTag`] and
    /// writing nothing if the field number is out of range.
    pub fn try_write_tag(
        &mut self,
        field_number: u32,
        wire_type: WireType,
    ) -> Result<&mut Self, CodecError> {
        let tag = Tag::new(field_number, wire_type)?;
        Ok(self.write_varint(u64::from(tag.to_raw())))
    }

    pub fn write_varint(&mut self, value: u64) -> &mut Self {
        encode_varint(value, self.current());
        self
    }

    pub fn write_uint32(&mut self, value: u32) -> &mut Self {
        self.write_varint(u64::from(value))
    }

    pub fn write_uint64(&mut self, value: u64) -> &mut Self {
        self.write_varint(value)
    }

    /// Writes an `int32` (or enum). Negative values are sign-extended to 64
    /// bits and take ten bytes.
    pub fn write_int32(&mut self, value: i32) -> &mut Self {
        self.write_varint(i64::from(value) as u64)
    }

    pub fn write_int64(&mut self, value: i64) -> &mut Self {
        self.write_varint(value as u64)
    }

    pub fn write_sint32(&mut self, value: i32) -> &mut Self {
        self.write_varint(u64::from(zigzag_encode32(value)))
    }

    pub fn write_sint64(&mut self, value: i64) -> &mut Self {
        self.write_varint(zigzag_encode64(value))
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.current().put_u8(u8::from(value));
        self
    }

    pub fn write_fixed32(&mut self, value: u32) -> &mut Self {
        self.current().put_u32_le(value);
        self
    }

    pub fn write_fixed64(&mut self, value: u64) -> &mut Self {
        self.current().put_u64_le(value);
        self
    }

    pub fn write_sfixed32(&mut self, value: i32) -> &mut Self {
        self.current().put_i32_le(value);
        self
    }

    pub fn write_sfixed64(&mut self, value: i64) -> &mut Self {
        self.current().put_i64_le(value);
        self
    }

    pub fn write_float(&mut self, value: f32) -> &mut Self {
        self.current().put_f32_le(value);
        self
    }

    pub fn write_double(&mut self, value: f64) -> &mut Self {
        self.current().put_f64_le(value);
        self
    }

    /// Writes a length prefix followed by `bytes`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_varint(bytes.len() as u64);
        self.write_raw(bytes)
    }

    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_bytes(value.as_bytes())
    }

    /// Writes `bytes` without a length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.current().put_slice(bytes);
        self
    }

    /// Starts a new frame. Writes go to it until the matching
    /// [`ldelim`](Self::ldelim).
    pub fn fork(&mut self) -> &mut Self {
        let frame = self.spare.pop().unwrap_or_default();
        self.forks.push(frame);
        self
    }

    /// Closes the innermost frame, writing its length and contents into the
    /// parent frame.
    pub fn ldelim(&mut self) -> Result<&mut Self, CodecError> {
        let mut child = self.forks.pop().ok_or(CodecError::ForkUnderflow)?;

        let parent = self.current();
        encode_varint(child.len() as u64, parent);
        parent.put_slice(&child);

        child.clear();
        self.spare.push(child);
        Ok(self)
    }

    /// Returns the encoded bytes and leaves the writer empty.
    pub fn finish(&mut self) -> Result<Bytes, CodecError> {
        if !self.forks.is_empty() {
            return Err(CodecError::UnclosedFork {
                open: self.forks.len(),
            });
        }
        Ok(self.root.split().freeze())
    }

    /// Discards all written bytes, including open forks.
    pub fn reset(&mut self) {
        self.root.clear();
        for mut frame in self.forks.drain(..) {
            frame.clear();
            self.spare.push(frame);
        }
    }

    /// Writes `message` as a length-delimited embedded message field.
    pub fn write_message<M: Message>(
        &mut self,
        field_number: u32,
        message: &M,
    ) -> Result<&mut Self, CodecError> {
        let mark = self.len();
        let depth = self.depth();
        self.write_tag(field_number, WireType::LengthDelimited).fork();
        if let Err(err) = message.encode_raw(self) {
            self.unwind(depth, mark);
            return Err(err);
        }
        self.ldelim()
    }

    // Drops frames opened above `depth` and cuts the frame below them back
    // to `mark` bytes.
    fn unwind(&mut self, depth: usize, mark: usize) {
        while self.forks.len() > depth {
            if let Some(mut frame) = self.forks.pop() {
                frame.clear();
                self.spare.push(frame);
            }
        }
        self.current().truncate(mark);
    }

    /// Writes a packed repeated scalar field. Nothing is written when
    /// `values` is empty.
    pub fn write_packed<T, I, F>(
        &mut self,
        field_number: u32,
        values: I,
        mut write: F,
    ) -> Result<&mut Self, CodecError>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T) -> &mut Self,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return Ok(self);
        }

        self.write_tag(field_number, WireType::LengthDelimited).fork();
        for value in values {
            write(self, value);
        }
        self.ldelim()
    }

    /// Writes a field from its raw wire value.
    pub fn write_field_value(&mut self, field_number: u32, value: &FieldValue<'_>) -> &mut Self {
        self.write_tag(field_number, value.wire_type());
        match *value {
            FieldValue::Varint(v) => self.write_varint(v),
            FieldValue::Fixed64(v) => self.write_fixed64(v),
            FieldValue::LengthDelimited(bytes) => self.write_bytes(bytes),
            FieldValue::Fixed32(v) => self.write_fixed32(v),
        }
    }
}
