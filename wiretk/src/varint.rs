//! The base-128 variable integer encoding from the
//! [protobuf encoding documentation](https://protobuf.dev/programming-guides/encoding/).
//!
//! By convention `From<I>` is implemented for all common integer types `I`.  Signed values are
//! sign-extended to 64 bits first, so a negative number always takes ten bytes.  Going the other
//! way, `TryFrom<v64>` checks for overflow.

use super::{Error, Packable};

/// The most bytes a varint may take on the wire.
pub const MAX_VARINT_BYTES: usize = 10;

/// Return the number of bytes `x` takes when encoded as a varint.
pub const fn varint_size(x: u64) -> usize {
    let bits = 64 - (x | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

////////////////////////////////////////////// Varint //////////////////////////////////////////////

/// v64 is the type of a variable integer encoding.  It can represent any value of 64-bits or
/// fewer.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct v64 {
    x: u64,
}

impl v64 {
    /// Parse a varint from the prefix of `buf`, returning it and the unparsed suffix.
    pub fn unpack(buf: &[u8]) -> Result<(v64, &[u8]), Error> {
        let mut x: u64 = 0;
        for (idx, byte) in buf.iter().take(MAX_VARINT_BYTES).enumerate() {
            if idx + 1 == MAX_VARINT_BYTES && *byte > 1 {
                // the tenth byte carries bit 63 and nothing more
                return Err(Error::MalformedVarint {
                    bytes: MAX_VARINT_BYTES,
                });
            }
            x |= ((byte & 0x7f) as u64) << (7 * idx);
            if byte & 0x80 == 0 {
                return Ok((v64 { x }, &buf[idx + 1..]));
            }
        }
        if buf.len() >= MAX_VARINT_BYTES {
            Err(Error::MalformedVarint {
                bytes: MAX_VARINT_BYTES,
            })
        } else {
            Err(Error::TruncatedInput {
                required: buf.len() + 1,
                had: buf.len(),
            })
        }
    }
}

macro_rules! v64_from_unsigned {
    ($what:ty) => {
        impl From<$what> for v64 {
            fn from(x: $what) -> v64 {
                v64 { x: x as u64 }
            }
        }

        impl TryFrom<v64> for $what {
            type Error = Error;

            fn try_from(v: v64) -> Result<$what, Error> {
                <$what>::try_from(v.x).map_err(|_| Error::UnsignedOverflow { value: v.x })
            }
        }
    };
}

macro_rules! v64_from_signed {
    ($what:ty) => {
        impl From<$what> for v64 {
            fn from(x: $what) -> v64 {
                v64 {
                    x: x as i64 as u64,
                }
            }
        }

        impl TryFrom<v64> for $what {
            type Error = Error;

            fn try_from(v: v64) -> Result<$what, Error> {
                let value: i64 = v.x as i64;
                <$what>::try_from(value).map_err(|_| Error::SignedOverflow { value })
            }
        }
    };
}

v64_from_unsigned!(u8);
v64_from_unsigned!(u16);
v64_from_unsigned!(u32);
v64_from_unsigned!(usize);

v64_from_signed!(i8);
v64_from_signed!(i16);
v64_from_signed!(i32);

impl From<u64> for v64 {
    fn from(x: u64) -> v64 {
        v64 { x }
    }
}

impl From<v64> for u64 {
    fn from(v: v64) -> u64 {
        v.x
    }
}

impl From<i64> for v64 {
    fn from(x: i64) -> v64 {
        v64 { x: x as u64 }
    }
}

impl From<v64> for i64 {
    fn from(v: v64) -> i64 {
        v.x as i64
    }
}

impl Packable for v64 {
    fn pack_sz(&self) -> usize {
        varint_size(self.x)
    }

    fn pack(&self, out: &mut Vec<u8>) {
        let mut x: u64 = self.x;
        while x >= 0x80 {
            out.push((x & 0x7f) as u8 | 0x80);
            x >>= 7;
        }
        out.push(x as u8);
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
