//! A point in time, laid out on the wire like `google.protobuf.Timestamp`.
//!
//! A timestamp travels as a length-delimited value holding seconds (field 1) and nanoseconds
//! (field 2).  Its length is computed from its own two integers, so unlike a nested record it never
//! takes a slot in the [crate::SizeCache].

use std::time::{SystemTime, UNIX_EPOCH};

use wiretk::{tag_size, v64, varint_size, FieldNumber, Input, Packable, Tag, WireType};

use super::Error;

const SECONDS: FieldNumber = FieldNumber::must(1);
const NANOS: FieldNumber = FieldNumber::must(2);

///////////////////////////////////////////// Timestamp ////////////////////////////////////////////

/// Seconds and nanoseconds since the Unix epoch.  Zero fields are left off the wire.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp::new(0, 0);

    pub const fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub const fn is_epoch(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    // Bytes inside the length prefix.
    fn body_size(&self) -> usize {
        let mut size = 0;
        if self.seconds != 0 {
            size += tag_size(SECONDS) + varint_size(self.seconds as u64);
        }
        if self.nanos != 0 {
            size += tag_size(NANOS) + varint_size(self.nanos as i64 as u64);
        }
        size
    }

    /// Read a length-delimited timestamp.  Sub-fields may come in either order and unknown ones
    /// are skipped.
    pub fn read(input: &mut Input<'_>) -> Result<Timestamp, Error> {
        let len = input.read_length()?;
        let saved = input.push_limit(len)?;
        let mut ts = Timestamp::EPOCH;
        while !input.at_limit() {
            let tag = input.read_tag()?;
            if tag.field_number == SECONDS {
                expect_varint(tag, "seconds")?;
                ts.seconds = input.read_varint64()? as i64;
            } else if tag.field_number == NANOS {
                expect_varint(tag, "nanos")?;
                ts.nanos = input.read_varint32()? as i32;
            } else {
                input.skip_field(tag.wire_type)?;
            }
        }
        input.pop_limit(saved)?;
        Ok(ts)
    }
}

fn expect_varint(tag: Tag, field: &'static str) -> Result<(), Error> {
    if tag.wire_type == WireType::Varint {
        Ok(())
    } else {
        Err(Error::WrongWireType {
            record: "Timestamp",
            field,
            expected: WireType::Varint,
            got: tag.wire_type,
        })
    }
}

// The length prefix is part of the packed form.
impl Packable for Timestamp {
    fn pack_sz(&self) -> usize {
        let body = self.body_size();
        varint_size(body as u64) + body
    }

    fn pack(&self, out: &mut Vec<u8>) {
        v64::from(self.body_size()).pack(out);
        if self.seconds != 0 {
            Tag::new(SECONDS, WireType::Varint).pack(out);
            v64::from(self.seconds).pack(out);
        }
        if self.nanos != 0 {
            Tag::new(NANOS, WireType::Varint).pack(out);
            v64::from(self.nanos).pack(out);
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(when: SystemTime) -> Self {
        match when.duration_since(UNIX_EPOCH) {
            Ok(since) => Timestamp::new(since.as_secs() as i64, since.subsec_nanos() as i32),
            Err(err) => {
                let before = err.duration();
                let seconds = -(before.as_secs() as i64);
                match before.subsec_nanos() {
                    0 => Timestamp::new(seconds, 0),
                    nanos => Timestamp::new(seconds - 1, 1_000_000_000 - nanos as i32),
                }
            }
        }
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
