//! The boundary between the codec and generated message types.
//!
//! A message type implements two methods: [`Message::encode_raw`] writes its
//! non-default fields in field-number order, and [`Message::merge_field`]
//! applies one field read from the wire. Everything else (framing, nesting,
//! depth limits, unknown-field skipping) is provided.
//!
//! ```
//! use pbwire_codec::{CodecError, Message, Reader, Tag, WireType, Writer};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct UserStats {
//!     taker_notional: u64,
//!     maker_notional: u64,
//! }
//!
//! impl Message for UserStats {
//!     fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError> {
//!         if self.taker_notional != 0 {
//!             writer.write_tag(1, WireType::Varint).write_uint64(self.taker_notional);
//!         }
//!         if self.maker_notional != 0 {
//!             writer.write_tag(2, WireType::Varint).write_uint64(self.maker_notional);
//!         }
//!         Ok(())
//!     }
//!
//!     fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError> {
//!         match tag.field_number() {
//!             1 if reader.accept(tag, WireType::Varint)? => {
//!                 self.taker_notional = reader.read_uint64()?
//!             }
//!             2 if reader.accept(tag, WireType::Varint)? => {
//!                 self.maker_notional = reader.read_uint64()?
//!             }
//!             1 | 2 => {}
//!             _ => reader.skip_field(tag)?,
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let stats = UserStats { maker_notional: 7, ..Default::default() };
//! let bytes = stats.encode_to_bytes().unwrap();
//! assert_eq!(&bytes[..], &[0x10, 0x07]);
//! assert_eq!(UserStats::decode_bytes(&bytes).unwrap(), stats);
//! ```

use crate::error::CodecError;
use crate::options::DecodeOptions;
use crate::reader::Reader;
use crate::wire::Tag;
use crate::writer::Writer;
use bytes::Bytes;

/// A Protocol Buffers message.
///
/// `Default` must produce the proto3 default for every field; partially
/// populated values are built with struct-update syntax.
pub trait Message: Default {
    /// Writes the message's fields, without an outer tag or length prefix.
    fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError>;

    /// Applies one field whose tag has just been read.
    ///
    /// Scalar fields overwrite, repeated fields append and embedded messages
    /// merge. Unrecognized field numbers must be passed to
    /// [`Reader::skip_field`].
    fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError>;

    /// Appends the encoded message to `writer`.
    fn encode<'w>(&self, writer: &'w mut Writer) -> Result<&'w mut Writer, CodecError> {
        self.encode_raw(writer)?;
        Ok(writer)
    }

    fn encode_to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut writer = Writer::new();
        self.encode_raw(&mut writer)?;
        writer.finish()
    }

    /// Size of the encoded message in bytes.
    fn encoded_len(&self) -> Result<usize, CodecError> {
        self.encode_to_bytes().map(|bytes| bytes.len())
    }

    /// Decodes a message from `reader`.
    ///
    /// With `Some(length)` exactly `length` bytes are consumed; with `None`
    /// fields are read up to the reader's end boundary. Neither form counts
    /// a nesting level. Embedded messages go through
    /// [`Reader::read_message`], which does.
    fn decode(reader: &mut Reader<'_>, length: Option<usize>) -> Result<Self, CodecError> {
        let mut message = Self::default();
        match length {
            Some(length) => {
                reader.delimited(length, |reader| reader.merge_fields(&mut message))?
            }
            None => reader.merge_fields(&mut message)?,
        }
        Ok(message)
    }

    fn decode_bytes(buf: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with_options(buf, DecodeOptions::default())
    }

    fn decode_with_options(buf: &[u8], options: DecodeOptions) -> Result<Self, CodecError> {
        let mut reader = Reader::with_options(buf, options);
        Self::decode(&mut reader, None)
    }
}
