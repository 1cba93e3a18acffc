//! Bounded, position-tracked reader over an encoded buffer.
//!
//! A [`Reader`] borrows the input and never reads outside `[position, end)`.
//! `end` starts at the end of the input and is narrowed while an embedded
//! message or packed block is being decoded, so a nested decoder cannot run
//! into its parent's bytes.
//!
//! A read that needs more bytes than remain fails with
//! [`CodecError::UnexpectedEof`] when `end` is the end of the input, and
//! with [`CodecError::BufferOverrun`] when `end` is a declared boundary,
//! even one that coincides with the last byte of the input. When
//! the overrun hits the boundary of an embedded message, it is reported as
//! [`CodecError::LengthMismatch`]: the declared length disagrees with the
//! content.

use crate::error::CodecError;
use crate::message::Message;
use crate::options::{DecodeOptions, Utf8Policy};
use crate::value::{FieldValue, Fields};
use crate::varint::{decode_varint, zigzag_decode32, zigzag_decode64, VarintError};
use crate::wire::{self, Dispatch, Tag, WireType};

/// Cursor over Protocol Buffers wire data.
///
/// Cloning a reader yields an independent cursor over the same bytes.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    // Set while `end` comes from a length prefix rather than the input.
    bounded: bool,
    depth: usize,
    options: DecodeOptions,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the whole of `buf` with default options.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecodeOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            buf,
            pos: 0,
            end: buf.len(),
            bounded: false,
            depth: 0,
            options,
        }
    }

    /// Current offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Offset at which the current message or block ends.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns true while the position is before the end boundary.
    pub fn remaining(&self) -> bool {
        self.pos < self.end
    }

    /// Number of bytes between the position and the end boundary.
    pub fn bytes_remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Number of embedded messages currently being decoded.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Returns an iterator over the raw fields up to the end boundary.
    pub fn fields(&mut self) -> Fields<'_, 'a> {
        Fields::new(self)
    }

    fn short_read(&self, needed: usize) -> CodecError {
        let available = self.bytes_remaining();
        if !self.bounded {
            CodecError::UnexpectedEof {
                needed,
                remaining: available,
            }
        } else {
            CodecError::BufferOverrun {
                requested: needed,
                available,
                limit: self.end,
            }
        }
    }

    /// Reads exactly `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.bytes_remaining() {
            return Err(self.short_read(n));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        match decode_varint(&self.buf[self.pos..self.end]) {
            Ok((value, len)) => {
                self.pos += len;
                Ok(value)
            }
            Err(VarintError::Overflow) => Err(CodecError::MalformedVarint),
            Err(VarintError::Truncated) => Err(self.short_read(self.bytes_remaining() + 1)),
        }
    }

    /// Reads a field tag.
    pub fn read_tag(&mut self) -> Result<Tag, CodecError> {
        let raw = self.read_varint()?;
        Tag::from_raw(raw)
    }

    /// Reads a `uint32`, keeping the low 32 bits of the varint.
    pub fn read_uint32(&mut self) -> Result<u32, CodecError> {
        Ok(self.read_varint()? as u32)
    }

    pub fn read_uint64(&mut self) -> Result<u64, CodecError> {
        self.read_varint()
    }

    /// Reads an `int32` (or enum), which is sign-extended on the wire.
    pub fn read_int32(&mut self) -> Result<i32, CodecError> {
        Ok(self.read_varint()? as i32)
    }

    pub fn read_int64(&mut self) -> Result<i64, CodecError> {
        Ok(self.read_varint()? as i64)
    }

    pub fn read_sint32(&mut self) -> Result<i32, CodecError> {
        Ok(zigzag_decode32(self.read_varint()? as u32))
    }

    pub fn read_sint64(&mut self) -> Result<i64, CodecError> {
        Ok(zigzag_decode64(self.read_varint()?))
    }

    /// Reads a `bool`. Any non-zero varint is true.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_varint()? != 0)
    }

    pub fn read_fixed32(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_fixed64(&mut self) -> Result<u64, CodecError> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_sfixed32(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_sfixed64(&mut self) -> Result<i64, CodecError> {
        self.read_array().map(i64::from_le_bytes)
    }

    pub fn read_float(&mut self) -> Result<f32, CodecError> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_double(&mut self) -> Result<f64, CodecError> {
        self.read_array().map(f64::from_le_bytes)
    }

    /// Reads a varint length prefix and checks it fits before the end boundary.
    pub fn read_length(&mut self) -> Result<usize, CodecError> {
        let len = self.read_varint()?;
        match usize::try_from(len) {
            Ok(len) if len <= self.bytes_remaining() => Ok(len),
            Ok(len) => Err(self.short_read(len)),
            Err(_) => Err(self.short_read(usize::MAX)),
        }
    }

    /// Reads a length prefix and returns the bytes it covers.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_length()?;
        self.read_bytes(len)
    }

    /// Reads a `bytes` field into an owned buffer.
    pub fn read_bytes_field(&mut self) -> Result<Vec<u8>, CodecError> {
        self.read_length_delimited().map(<[u8]>::to_vec)
    }

    /// Reads a `string` field, applying the configured UTF-8 policy.
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let bytes = self.read_length_delimited()?;
        match self.options.utf8 {
            Utf8Policy::Strict => Ok(std::str::from_utf8(bytes)?.to_owned()),
            Utf8Policy::Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Reads the value following a tag without interpreting it.
    pub fn read_value(&mut self, wire_type: WireType) -> Result<FieldValue<'a>, CodecError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(FieldValue::Varint),
            WireType::Fixed64 => self.read_fixed64().map(FieldValue::Fixed64),
            WireType::LengthDelimited => self
                .read_length_delimited()
                .map(FieldValue::LengthDelimited),
            WireType::Fixed32 => self.read_fixed32().map(FieldValue::Fixed32),
            WireType::StartGroup | WireType::EndGroup => {
                Err(CodecError::UnsupportedWireType(wire_type as u8))
            }
        }
    }

    /// Discards one value of the given wire type.
    ///
    /// Groups are not supported and fail with
    /// [`CodecError::UnsupportedWireType`].
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), CodecError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_bytes(4)?;
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(CodecError::UnsupportedWireType(wire_type as u8));
            }
        }
        Ok(())
    }

    /// Skips the value of a field the decoder does not recognize.
    pub fn skip_field(&mut self, tag: Tag) -> Result<(), CodecError> {
        tracing::trace!(
            "Skipping unknown field {} ({}) at offset {}",
            tag.field_number(),
            tag.wire_type(),
            self.pos
        );
        self.skip(tag.wire_type())
    }

    /// Checks `tag` against the wire type the schema declares for it.
    pub fn dispatch(
        &self,
        tag: Tag,
        expected: WireType,
        packable: bool,
    ) -> Result<Dispatch, CodecError> {
        wire::dispatch(tag, expected, packable, self.options.wire_type_policy)
    }

    /// Returns true if a singular field should be read with its declared
    /// type. Under the lenient policy a mismatched field is skipped here and
    /// false is returned.
    pub fn accept(&mut self, tag: Tag, expected: WireType) -> Result<bool, CodecError> {
        match self.dispatch(tag, expected, false)? {
            Dispatch::Read | Dispatch::ReadPacked => Ok(true),
            Dispatch::Skip => {
                self.skip(tag.wire_type())?;
                Ok(false)
            }
        }
    }

    /// Decodes an embedded message of known type: a length prefix followed
    /// by exactly that many bytes of fields.
    pub fn read_message<M: Message>(&mut self) -> Result<M, CodecError> {
        let len = self.read_length()?;
        self.limited(len, |reader| {
            let mut message = M::default();
            reader.merge_fields(&mut message)?;
            Ok(message)
        })
    }

    /// Decodes an embedded message into an existing value.
    ///
    /// Scalar fields present on the wire overwrite, repeated fields append
    /// and embedded messages merge recursively.
    pub fn merge_message<M: Message>(&mut self, message: &mut M) -> Result<(), CodecError> {
        let len = self.read_length()?;
        self.limited(len, |reader| reader.merge_fields(message))
    }

    /// Decodes fields into `message` until the end boundary.
    pub fn merge_fields<M: Message>(&mut self, message: &mut M) -> Result<(), CodecError> {
        while self.remaining() {
            let tag = self.read_tag()?;
            message.merge_field(tag, self)?;
        }
        Ok(())
    }

    /// Runs `f` with the end boundary narrowed to the next `len` bytes.
    ///
    /// Counts one level of nesting. Fails with [`CodecError::LengthMismatch`]
    /// if `f` tries to read past the narrowed boundary or does not consume
    /// exactly `len` bytes.
    pub fn limited<T>(
        &mut self,
        len: usize,
        f: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        self.framed(len, true, f)
    }

    /// Like [`Reader::limited`], but without counting a nesting level.
    ///
    /// Used for the outermost message when its length is known up front.
    pub fn delimited<T>(
        &mut self,
        len: usize,
        f: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        self.framed(len, false, f)
    }

    fn framed<T>(
        &mut self,
        len: usize,
        nested: bool,
        f: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        if len > self.bytes_remaining() {
            return Err(self.short_read(len));
        }
        if nested && self.depth >= self.options.max_depth {
            tracing::debug!(
                "Nesting depth limit {} reached at offset {}",
                self.options.max_depth,
                self.pos
            );
            return Err(CodecError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }

        let child_end = self.pos + len;
        let parent_end = std::mem::replace(&mut self.end, child_end);
        let parent_bounded = std::mem::replace(&mut self.bounded, true);
        let levels = usize::from(nested);
        self.depth += levels;
        let result = f(self);
        self.depth -= levels;
        self.end = parent_end;
        self.bounded = parent_bounded;

        let value = result.map_err(|err| overrun_to_mismatch(err, child_end))?;
        if self.pos != child_end {
            tracing::debug!(
                "Embedded message declared end {} but stopped at {}",
                child_end,
                self.pos
            );
            return Err(CodecError::LengthMismatch {
                declared_end: child_end,
                actual_end: self.pos,
            });
        }
        Ok(value)
    }

    /// Reads a packed block of scalar values.
    pub fn read_packed<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let len = self.read_length()?;
        let block_end = self.pos + len;
        let parent_end = std::mem::replace(&mut self.end, block_end);
        let parent_bounded = std::mem::replace(&mut self.bounded, true);

        let mut values = Vec::new();
        let mut result = Ok(());
        while self.pos < block_end {
            match read(self) {
                Ok(value) => values.push(value),
                Err(err) => {
                    result = Err(overrun_to_mismatch(err, block_end));
                    break;
                }
            }
        }
        self.end = parent_end;
        self.bounded = parent_bounded;
        result.map(|()| values)
    }

    /// Reads one occurrence of a repeated scalar field, packed or not, and
    /// appends the values to `out`.
    pub fn read_repeated<T>(
        &mut self,
        tag: Tag,
        expected: WireType,
        out: &mut Vec<T>,
        mut read: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<(), CodecError> {
        match self.dispatch(tag, expected, true)? {
            Dispatch::Read => out.push(read(self)?),
            Dispatch::ReadPacked => out.extend(self.read_packed(read)?),
            Dispatch::Skip => self.skip(tag.wire_type())?,
        }
        Ok(())
    }

    /// Splits off an independent reader over the next `len` bytes and moves
    /// this reader past them.
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader<'a>, CodecError> {
        if len > self.bytes_remaining() {
            return Err(self.short_read(len));
        }
        if self.depth >= self.options.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }

        let child = Reader {
            buf: self.buf,
            pos: self.pos,
            end: self.pos + len,
            bounded: true,
            depth: self.depth + 1,
            options: self.options,
        };
        self.pos += len;
        Ok(child)
    }
}

/// Rewrites an overrun of `boundary` as a length mismatch, keeping any field
/// context attached on the way up.
fn overrun_to_mismatch(err: CodecError, boundary: usize) -> CodecError {
    match err {
        CodecError::BufferOverrun {
            requested,
            available,
            limit,
        } if limit == boundary => {
            tracing::debug!(
                "Read of {} bytes crosses declared end {}",
                requested,
                boundary
            );
            CodecError::LengthMismatch {
                declared_end: boundary,
                actual_end: (boundary - available).saturating_add(requested),
            }
        }
        CodecError::Field {
            message,
            field,
            source,
        } => CodecError::Field {
            message,
            field,
            source: Box::new(overrun_to_mismatch(*source, boundary)),
        },
        other => other,
    }
}
