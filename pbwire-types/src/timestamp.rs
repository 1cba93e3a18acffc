//! `google.protobuf.Timestamp`.

use crate::error::TypeError;
use crate::name::Name;
use chrono::{DateTime, Utc};
use pbwire_codec::{CodecError, Message, Reader, Tag, WireType, Writer};
use serde::{Deserialize, Serialize};

pub(crate) const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// A point in time as seconds and nanoseconds since the Unix epoch.
///
/// `nanos` counts forward from `seconds`, so an instant before the epoch has
/// a negative `seconds` and a non-negative `nanos`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Field 1, `int64`.
    pub seconds: i64,
    /// Field 2, `int32`. Valid values are `0..1_000_000_000`.
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub fn now() -> Self {
        Utc::now().into()
    }

    /// Carries whole seconds out of `nanos` so that it ends up in
    /// `0..1_000_000_000`. Saturates at the bounds of `seconds`.
    pub fn normalize(&mut self) {
        if self.nanos <= -NANOS_PER_SECOND || self.nanos >= NANOS_PER_SECOND {
            self.seconds = self
                .seconds
                .saturating_add(i64::from(self.nanos / NANOS_PER_SECOND));
            self.nanos %= NANOS_PER_SECOND;
        }
        if self.nanos < 0 {
            match self.seconds.checked_sub(1) {
                Some(seconds) => {
                    self.seconds = seconds;
                    self.nanos += NANOS_PER_SECOND;
                }
                None => self.nanos = 0,
            }
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        // Leap seconds report nanos past one second.
        let mut timestamp = Self {
            seconds: time.timestamp(),
            nanos: time.timestamp_subsec_nanos() as i32,
        };
        timestamp.normalize();
        timestamp
    }
}

impl TryFrom<Timestamp> for DateTime<Utc> {
    type Error = TypeError;

    fn try_from(timestamp: Timestamp) -> Result<Self, Self::Error> {
        let out_of_range = TypeError::TimestampOutOfRange {
            seconds: timestamp.seconds,
            nanos: timestamp.nanos,
        };
        if !(0..NANOS_PER_SECOND).contains(&timestamp.nanos) {
            return Err(out_of_range);
        }
        DateTime::from_timestamp(timestamp.seconds, timestamp.nanos as u32).ok_or(out_of_range)
    }
}

impl Message for Timestamp {
    fn encode_raw(&self, writer: &mut Writer) -> Result<(), CodecError> {
        if self.seconds != 0 {
            writer.write_tag(1, WireType::Varint).write_int64(self.seconds);
        }
        if self.nanos != 0 {
            writer.write_tag(2, WireType::Varint).write_int32(self.nanos);
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: Tag, reader: &mut Reader<'_>) -> Result<(), CodecError> {
        match tag.field_number() {
            1 if reader.accept(tag, WireType::Varint)? => self.seconds = reader.read_int64()?,
            2 if reader.accept(tag, WireType::Varint)? => self.nanos = reader.read_int32()?,
            1 | 2 => {}
            _ => reader.skip_field(tag)?,
        }
        Ok(())
    }
}

impl Name for Timestamp {
    const NAME: &'static str = "Timestamp";
    const PACKAGE: &'static str = "google.protobuf";
}
