//! # pbwire
//!
//! Protocol Buffers binary wire codec with bounded, panic-free decoding.
//!
//! The codec lives in [`pbwire_codec`] and is re-exported here; the
//! well-known `google.protobuf` types are under [`types`].
//!
//! ```
//! use pbwire::types::{Any, Timestamp};
//! use pbwire::Message;
//!
//! let any = Any::pack(&Timestamp::new(1_700_000_000, 0)).unwrap();
//! let bytes = any.encode_to_bytes().unwrap();
//! let decoded = Any::decode_bytes(&bytes).unwrap();
//! assert_eq!(decoded.unpack::<Timestamp>().unwrap().seconds, 1_700_000_000);
//! ```

pub use pbwire_codec::*;
pub use pbwire_types as types;
