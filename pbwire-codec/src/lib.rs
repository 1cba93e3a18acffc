//! # pbwire-codec
//!
//! Protocol Buffers wire-format codec.
//!
//! This crate provides:
//! - Varint, zigzag and fixed-width primitive encoding
//! - A forking [`Writer`] that back-fills the length of embedded messages
//! - A bounded [`Reader`] with nesting limits and strict length checks
//! - Wire-type dispatch with a configurable mismatch policy
//! - The [`Message`] trait implemented by generated message types
//!
//! Encoding follows <https://protobuf.dev/programming-guides/encoding/>.
//! Groups (wire types 3 and 4) are recognized in tags but never decoded.

pub mod error;
pub mod message;
pub mod options;
pub mod reader;
pub mod value;
pub mod varint;
pub mod wire;
pub mod writer;

pub use error::CodecError;
pub use message::Message;
pub use options::{DecodeOptions, Utf8Policy};
pub use reader::Reader;
pub use value::{FieldValue, Fields};
pub use wire::{dispatch, Dispatch, Tag, WireType, WireTypePolicy, MAX_FIELD_NUMBER};
pub use writer::Writer;

/// Default limit on nested embedded messages.
pub const DEFAULT_MAX_DEPTH: usize = 100;
