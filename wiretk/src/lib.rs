#![doc = include_str!("../README.md")]

use std::fmt::{Display, Formatter};

mod input;
mod varint;

pub mod dump;

pub use input::Input;
pub use varint::v64;
pub use varint::varint_size;
pub use varint::MAX_VARINT_BYTES;

/////////////////////////////////////////////// Error //////////////////////////////////////////////

/// The errors a wire-level read may produce.  Writes into a `Vec<u8>` cannot fail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A read needed more bytes than remained before the current limit.
    TruncatedInput {
        /// Bytes the read needed.
        required: usize,
        /// Bytes that remained.
        had: usize,
    },
    /// A varint ran past ten bytes, or its tenth byte set more than bit 63.
    MalformedVarint {
        /// Bytes consumed before giving up.
        bytes: usize,
    },
    /// A length-delimited region was not consumed exactly.
    LimitMismatch {
        /// Where the cursor stopped.
        offset: usize,
        /// Where the region said it would end.
        limit: usize,
    },
    /// A varint did not fit the unsigned type it was read into.
    UnsignedOverflow {
        /// The value on the wire.
        value: u64,
    },
    /// A varint did not fit the signed type it was read into.
    SignedOverflow {
        /// The value on the wire.
        value: i64,
    },
    /// A tag did not fit in 32 bits.
    TagTooLarge {
        /// The tag as read.
        tag: u64,
    },
    /// A field number was zero, too large, or reserved.
    InvalidFieldNumber {
        /// The field number.
        field_number: u32,
        /// A short description of what is wrong with it.
        what: &'static str,
    },
    /// A wire type other than varint, fixed64, length-delimited or fixed32.
    UnhandledWireType {
        /// The low three bits of the tag.
        wire_type: u32,
    },
    /// A string field held bytes that are not UTF-8.
    StringEncoding,
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::TruncatedInput { required, had } => {
                write!(fmt, "truncated input: required {} bytes, had {}", required, had)
            }
            Error::MalformedVarint { bytes } => {
                write!(fmt, "malformed varint after {} bytes", bytes)
            }
            Error::LimitMismatch { offset, limit } => {
                write!(fmt, "limit mismatch: offset={} limit={}", offset, limit)
            }
            Error::UnsignedOverflow { value } => {
                write!(fmt, "unsigned overflow: {}", value)
            }
            Error::SignedOverflow { value } => {
                write!(fmt, "signed overflow: {}", value)
            }
            Error::TagTooLarge { tag } => {
                write!(fmt, "tag too large: {}", tag)
            }
            Error::InvalidFieldNumber { field_number, what } => {
                write!(fmt, "invalid field number {}: {}", field_number, what)
            }
            Error::UnhandledWireType { wire_type } => {
                write!(fmt, "unhandled wire type: {}", wire_type)
            }
            Error::StringEncoding => {
                write!(fmt, "string is not valid UTF-8")
            }
        }
    }
}

impl std::error::Error for Error {}

///////////////////////////////////////////// Packable /////////////////////////////////////////////

/// Packable objects can be appended to a byte vector.  `pack_sz` must return exactly the number
/// of bytes `pack` appends.
pub trait Packable {
    /// The number of bytes `pack` will append.
    fn pack_sz(&self) -> usize;
    /// Append the encoded bytes to `out`.
    fn pack(&self, out: &mut Vec<u8>);
}

impl<P: Packable + ?Sized> Packable for &P {
    fn pack_sz(&self) -> usize {
        (*self).pack_sz()
    }

    fn pack(&self, out: &mut Vec<u8>) {
        (*self).pack(out)
    }
}

macro_rules! packable_fixed {
    ($what:ty) => {
        impl Packable for $what {
            fn pack_sz(&self) -> usize {
                std::mem::size_of::<$what>()
            }

            fn pack(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

packable_fixed!(u32);
packable_fixed!(u64);
packable_fixed!(f32);
packable_fixed!(f64);

// Byte strings carry a varint length prefix.
impl Packable for [u8] {
    fn pack_sz(&self) -> usize {
        varint_size(self.len() as u64) + self.len()
    }

    fn pack(&self, out: &mut Vec<u8>) {
        v64::from(self.len()).pack(out);
        out.extend_from_slice(self);
    }
}

impl Packable for str {
    fn pack_sz(&self) -> usize {
        self.as_bytes().pack_sz()
    }

    fn pack(&self, out: &mut Vec<u8>) {
        self.as_bytes().pack(out)
    }
}

///////////////////////////////////////////// WireType /////////////////////////////////////////////

/// The four wire types a tag may carry.  Group start and end are not supported.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WireType {
    /// Base-128 varint.
    Varint,
    /// Eight little-endian bytes.
    SixtyFour,
    /// A varint length and that many bytes.
    LengthDelimited,
    /// Four little-endian bytes.
    ThirtyTwo,
}

impl WireType {
    /// Interpret the low three bits of a tag.
    pub fn new(tag_bits: u32) -> Result<WireType, Error> {
        match tag_bits {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::SixtyFour),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::ThirtyTwo),
            _ => Err(Error::UnhandledWireType {
                wire_type: tag_bits,
            }),
        }
    }

    /// The low three bits of a tag carrying this wire type.
    pub const fn tag_bits(&self) -> u32 {
        match self {
            WireType::Varint => 0,
            WireType::SixtyFour => 1,
            WireType::LengthDelimited => 2,
            WireType::ThirtyTwo => 5,
        }
    }
}

/////////////////////////////////////////// FieldNumber ////////////////////////////////////////////

/// A field number in the range `[1, 2^29)`.  Numbers chosen for a schema must also avoid the
/// reserved block; numbers read off the wire need not.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FieldNumber {
    field_number: u32,
}

impl FieldNumber {
    /// The smallest valid field number.
    pub const FIRST: u32 = 1;
    /// The largest valid field number.
    pub const LAST: u32 = (1 << 29) - 1;
    /// The first number of the block protobuf reserves for itself.
    pub const FIRST_RESERVED: u32 = 19_000;
    /// The last number of the block protobuf reserves for itself.
    pub const LAST_RESERVED: u32 = 19_999;

    /// Validate `field_number` for use in a schema.
    pub const fn new(field_number: u32) -> Result<FieldNumber, Error> {
        if field_number >= Self::FIRST_RESERVED && field_number <= Self::LAST_RESERVED {
            return Err(Error::InvalidFieldNumber {
                field_number,
                what: "field number reserved",
            });
        }
        Self::on_wire(field_number)
    }

    /// Validate `field_number` as read from an encoded message.  Only the range is checked, so a
    /// field in the reserved block can still be skipped.
    pub const fn on_wire(field_number: u32) -> Result<FieldNumber, Error> {
        if field_number < Self::FIRST {
            return Err(Error::InvalidFieldNumber {
                field_number,
                what: "field number must be positive",
            });
        }
        if field_number > Self::LAST {
            return Err(Error::InvalidFieldNumber {
                field_number,
                what: "field number too large",
            });
        }
        Ok(FieldNumber { field_number })
    }

    /// Validate `field_number` or panic.  Intended for constant contexts where a panic is a
    /// compile error.
    pub const fn must(field_number: u32) -> FieldNumber {
        match FieldNumber::new(field_number) {
            Ok(field_number) => field_number,
            Err(_) => panic!("invalid field number"),
        }
    }

    /// The field number as an integer.
    pub const fn get(&self) -> u32 {
        self.field_number
    }
}

impl From<FieldNumber> for u32 {
    fn from(f: FieldNumber) -> u32 {
        f.field_number
    }
}

impl PartialEq<u32> for FieldNumber {
    fn eq(&self, other: &u32) -> bool {
        self.field_number == *other
    }
}

impl Display for FieldNumber {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.field_number)
    }
}

//////////////////////////////////////////////// Tag ///////////////////////////////////////////////

/// A field number paired with the wire type of the value that follows it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag {
    /// The field this tag introduces.
    pub field_number: FieldNumber,
    /// How the value is laid out.
    pub wire_type: WireType,
}

impl Tag {
    /// Create a new tag.
    pub const fn new(field_number: FieldNumber, wire_type: WireType) -> Tag {
        Tag {
            field_number,
            wire_type,
        }
    }

    /// Split a 32-bit tag into its field number and wire type.
    pub fn from_u32(tag: u32) -> Result<Tag, Error> {
        let wire_type = WireType::new(tag & 7)?;
        let field_number = FieldNumber::on_wire(tag >> 3)?;
        Ok(Tag {
            field_number,
            wire_type,
        })
    }

    /// The tag as it appears, before varint encoding, on the wire.
    pub const fn value(&self) -> u32 {
        (self.field_number.get() << 3) | self.wire_type.tag_bits()
    }
}

impl Packable for Tag {
    fn pack_sz(&self) -> usize {
        varint_size(self.value() as u64)
    }

    fn pack(&self, out: &mut Vec<u8>) {
        v64::from(self.value()).pack(out)
    }
}

/// The number of bytes the tag for `field_number` takes on the wire.  The wire type does not
/// change the size.
pub const fn tag_size(field_number: FieldNumber) -> usize {
    varint_size((field_number.get() as u64) << 3)
}

/// Build a [Tag] from a literal field number and wire type name.
///
/// ```
/// use wiretk::{tag, Tag, WireType, FieldNumber};
/// assert_eq!(tag!(2, LengthDelimited), Tag::new(FieldNumber::must(2), WireType::LengthDelimited));
/// ```
#[macro_export]
macro_rules! tag {
    ($field_number:literal, $wire_type:ident) => {
        $crate::Tag::new(
            $crate::FieldNumber::must($field_number),
            $crate::WireType::$wire_type,
        )
    };
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
