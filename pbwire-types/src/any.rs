//! `google.protobuf.Any`: a message of any type together with its type URL.

use crate::error::TypeError;
use crate::name::{full_name_of, Name};
use pbwire_codec::{CodecError, DecodeOptions, Message, Reader, Tag, WireType, Writer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Any {
    /// Field 1. Identifies the packed message type; the part after the last
    /// `/` is its full name.
    pub type_url: String,
    /// Field 2. The encoded message.
    pub value: Vec<u8>,
}

impl Any {
    /// Encodes `message` and records its type URL.
    pub fn pack<M: Name>(message: &M) -> Result<Self, TypeError> {
        Ok(Self {
            type_url: M::type_url(),
            value: message.encode_to_bytes()?.to_vec(),
        })
    }

    /// Returns whether the packed message is an `M`.
    ///
    /// Only the full name is compared, so `type.googleapis.com/pkg.Msg`
    /// and `/pkg.Msg` refer to the same type.
    pub fn is<M: Name>(&self) -> bool {
        full_name_of(&self.type_url) == Some(M::full_name().as_str())
    }

    /// Decodes the packed message as an `M`.
    pub fn unpack<M: Name>(&self) -> Result<M, TypeError> {
        self.unpack_with_options(DecodeOptions::default())
    }

    pub fn unpack_with_options<M: Name>(&self, options: DecodeOptions) -> Result<M, TypeError> {
        if !self.is::<M>() {
            tracing::debug!(
                "Cannot unpack {} as {}",
                self.type_url,
                M::full_name()
            );
            return Err(TypeError::TypeUrlMismatch {
                expected: M::type_url(),
                actual: self.type_url.clone(),
            });
        }
        Ok(M::decode_with_options(&self.value, options)?)
    }
}

impl Message for Any {
    fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError> {
        if !self.type_url.is_empty() {
            writer
                .write_tag(1, WireType::LengthDelimited)
                .write_string(&self.type_url);
        }
        if !self.value.is_empty() {
            writer
                .write_tag(2, WireType::LengthDelimited)
                .write_bytes(&self.value);
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError> {
        let field = tag.field_number();
        let result = match field {
            1 => reader
                .accept(tag, WireType::LengthDelimited)
                .and_then(|read| {
                    if read {
                        self.type_url = reader.read_string()?;
                    }
                    Ok(())
                }),
            2 => reader
                .accept(tag, WireType::LengthDelimited)
                .and_then(|read| {
                    if read {
                        self.value = reader.read_bytes_field()?;
                    }
                    Ok(())
                }),
            _ => return reader.skip_field(tag),
        };
        result.map_err(|err| err.in_field(Self::NAME, field))
    }
}

impl Name for Any {
    const NAME: &'static str = "Any";
    const PACKAGE: &'static str = "google.protobuf";
}
