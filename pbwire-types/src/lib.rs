//! # pbwire-types
//!
//! Well-known Protocol Buffers message types from the `google.protobuf`
//! package, which schemas embed for times, spans and type-erased payloads.
//!
//! - [`Timestamp`] converts to and from `chrono::DateTime<Utc>`
//! - [`Duration`] converts to and from `std::time::Duration`
//! - [`Any`] packs any message implementing [`Name`]

pub mod any;
pub mod duration;
pub mod error;
pub mod name;
pub mod timestamp;

pub use any::Any;
pub use duration::Duration;
pub use error::TypeError;
pub use name::Name;
pub use timestamp::Timestamp;
