//! `google.protobuf.Duration`.

use crate::error::TypeError;
use crate::name::Name;
use crate::timestamp::NANOS_PER_SECOND;
use pbwire_codec::{CodecError, Message, Reader, Tag, WireType, Writer};
use serde::{Deserialize, Serialize};

/// A signed span of time.
///
/// For a normalized duration `seconds` and `nanos` have the same sign (or
/// one of them is zero), and `nanos` lies in `-999_999_999..=999_999_999`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// Field 1, `int64`.
    pub seconds: i64,
    /// Field 2, `int32`.
    pub nanos: i32,
}

impl Duration {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Carries whole seconds out of `nanos` and gives both parts the same
    /// sign. Saturates at the bounds of `seconds`.
    pub fn normalize(&mut self) {
        if self.nanos <= -NANOS_PER_SECOND || self.nanos >= NANOS_PER_SECOND {
            self.seconds = self
                .seconds
                .saturating_add(i64::from(self.nanos / NANOS_PER_SECOND));
            self.nanos %= NANOS_PER_SECOND;
        }
        if self.seconds < 0 && self.nanos > 0 {
            self.seconds += 1;
            self.nanos -= NANOS_PER_SECOND;
        } else if self.seconds > 0 && self.nanos < 0 {
            self.seconds -= 1;
            self.nanos += NANOS_PER_SECOND;
        }
    }

    pub fn is_negative(&self) -> bool {
        self.seconds < 0 || (self.seconds == 0 && self.nanos < 0)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = TypeError;

    fn try_from(duration: std::time::Duration) -> Result<Self, Self::Error> {
        let seconds =
            i64::try_from(duration.as_secs()).map_err(|_| TypeError::DurationOutOfRange)?;
        Ok(Self {
            seconds,
            nanos: duration.subsec_nanos() as i32,
        })
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = TypeError;

    // std::time::Duration has no negative values.
    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        let mut duration = duration;
        duration.normalize();
        if duration.is_negative() {
            return Err(TypeError::DurationOutOfRange);
        }
        Ok(std::time::Duration::new(
            duration.seconds as u64,
            duration.nanos as u32,
        ))
    }
}

impl Message for Duration {
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

impl Name for Duration {
    const NAME: &'static str = "Duration";
    const PACKAGE: &'static str = "google.protobuf";
}
