#![doc = include_str!("../README.md")]

use std::fmt::{Display, Formatter};

use biometrics::{Collector, Counter};
use wiretk::WireType;

mod cache;
mod descriptor;
mod dynamic;
mod record;
mod timestamp;
mod traversal;
mod value;

pub mod decoder;
pub mod encoder;
pub mod sizer;

pub use cache::SizeCache;
pub use descriptor::{FieldDescriptor, FieldKind, Presence, RecordDescriptor, ScalarType};
pub use dynamic::DynamicRecord;
pub use record::Record;
pub use timestamp::Timestamp;
pub use value::{FromScalar, ListValue, Scalar, ScalarList, Value};

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static ENCODE: Counter = Counter::new("recordtk.encode");
static ENCODE_BYTES: Counter = Counter::new("recordtk.encode.bytes");
static ENCODE_ERROR: Counter = Counter::new("recordtk.encode.error");
static DECODE: Counter = Counter::new("recordtk.decode");
static DECODE_BYTES: Counter = Counter::new("recordtk.decode.bytes");
static DECODE_ERROR: Counter = Counter::new("recordtk.decode.error");
static UNKNOWN_FIELD: Counter = Counter::new("recordtk.decode.unknown_field");
static SIZE_CACHE_GROW: Counter = Counter::new("recordtk.size_cache.grow");

/// Register this crate's counters with `collector`.
pub fn register_biometrics(collector: &Collector) {
    collector.register_counter(&ENCODE);
    collector.register_counter(&ENCODE_BYTES);
    collector.register_counter(&ENCODE_ERROR);
    collector.register_counter(&DECODE);
    collector.register_counter(&DECODE_BYTES);
    collector.register_counter(&DECODE_ERROR);
    collector.register_counter(&UNKNOWN_FIELD);
    collector.register_counter(&SIZE_CACHE_GROW);
}

/////////////////////////////////////////////// Error //////////////////////////////////////////////

/// Everything that can go wrong encoding or decoding a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A read needed more bytes than remained.
    TruncatedInput { required: usize, had: usize },
    /// A varint ran past ten bytes.
    MalformedVarint { bytes: usize },
    /// A nested message or packed list ended somewhere other than where its length said.
    LimitMismatch { offset: usize, limit: usize },
    /// A length did not fit in a `usize`.
    UnsignedOverflow { value: u64 },
    /// A value did not fit its signed type.
    SignedOverflow { value: i64 },
    /// A tag wider than 32 bits.
    TagTooLarge { tag: u64 },
    /// A tag with field number zero, or a field number out of range.
    InvalidFieldNumber { field_number: u32, what: &'static str },
    /// A group start or end, or another wire type this codec does not read.
    UnhandledWireType { wire_type: u32 },
    /// A known field arrived with a wire type other than the one its kind requires.
    WrongWireType {
        record: &'static str,
        field: &'static str,
        expected: WireType,
        got: WireType,
    },
    /// A string field that is not UTF-8.
    StringEncoding,
    /// The encoder asked for a size the size pass never stored.
    CacheIndexOverflow { index: usize, len: usize },
    /// A record wrote a different number of bytes than the size pass computed for it.
    CacheMismatch { expected: usize, written: usize },
    /// A record returned a value whose type differs from its field's declared type.
    TypeMismatch {
        field: &'static str,
        expected: ScalarType,
        got: ScalarType,
    },
    /// A nested record's descriptor differs from the one its field declares.
    DescriptorMismatch {
        field: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    /// A record does not implement the operation its field's kind needs.
    Unsupported {
        record: &'static str,
        field: &'static str,
        what: &'static str,
    },
    /// No field has this name.
    NoSuchField { record: &'static str, field: String },
    /// Messages nested deeper than the decoder allows.
    RecursionLimit { limit: usize },
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
            Error::UnsignedOverflow { value } => write!(fmt, "unsigned overflow: {}", value),
            Error::SignedOverflow { value } => write!(fmt, "signed overflow: {}", value),
            Error::TagTooLarge { tag } => write!(fmt, "tag too large: {}", tag),
            Error::InvalidFieldNumber { field_number, what } => {
                write!(fmt, "invalid field number {}: {}", field_number, what)
            }
            Error::UnhandledWireType { wire_type } => {
                write!(fmt, "unhandled wire type: {}", wire_type)
            }
            Error::WrongWireType {
                record,
                field,
                expected,
                got,
            } => write!(
                fmt,
                "{}.{}: expected wire type {:?}, got {:?}",
                record, field, expected, got
            ),
            Error::StringEncoding => write!(fmt, "string is not valid UTF-8"),
            Error::CacheIndexOverflow { index, len } => {
                write!(fmt, "size cache has {} slots, asked for {}", len, index)
            }
            Error::CacheMismatch { expected, written } => {
                write!(fmt, "sized {} bytes but wrote {}", expected, written)
            }
            Error::TypeMismatch {
                field,
                expected,
                got,
            } => write!(fmt, "{}: expected {:?}, got {:?}", field, expected, got),
            Error::DescriptorMismatch {
                field,
                expected,
                got,
            } => write!(fmt, "{}: expected record {}, got {}", field, expected, got),
            Error::Unsupported { record, field, what } => {
                write!(fmt, "{}.{} does not support {}", record, field, what)
            }
            Error::NoSuchField { record, field } => {
                write!(fmt, "{} has no field named {}", record, field)
            }
            Error::RecursionLimit { limit } => {
                write!(fmt, "messages nested more than {} deep", limit)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<wiretk::Error> for Error {
    fn from(err: wiretk::Error) -> Self {
        match err {
            wiretk::Error::TruncatedInput { required, had } => {
                Error::TruncatedInput { required, had }
            }
            wiretk::Error::MalformedVarint { bytes } => Error::MalformedVarint { bytes },
            wiretk::Error::LimitMismatch { offset, limit } => {
                Error::LimitMismatch { offset, limit }
            }
            wiretk::Error::UnsignedOverflow { value } => Error::UnsignedOverflow { value },
            wiretk::Error::SignedOverflow { value } => Error::SignedOverflow { value },
            wiretk::Error::TagTooLarge { tag } => Error::TagTooLarge { tag },
            wiretk::Error::InvalidFieldNumber { field_number, what } => {
                Error::InvalidFieldNumber { field_number, what }
            }
            wiretk::Error::UnhandledWireType { wire_type } => {
                Error::UnhandledWireType { wire_type }
            }
            wiretk::Error::StringEncoding => Error::StringEncoding,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}

///////////////////////////////////////////// top level ////////////////////////////////////////////

/// The encoded size of `record`.
pub fn compute_size(record: &dyn Record) -> Result<usize, Error> {
    let mut cache = SizeCache::new();
    sizer::compute_size(record, &mut cache, 0)?;
    cache.get(0)
}

/// Encode `record` into a new buffer of exactly the right size.
pub fn encode(record: &dyn Record) -> Result<Vec<u8>, Error> {
    let mut cache = SizeCache::new();
    let mut out = Vec::new();
    encode_with_cache(record, &mut cache, &mut out)?;
    Ok(out)
}

/// Encode `record` onto the end of `out`, reusing `cache`.  The cache is cleared first.
pub fn encode_with_cache(
    record: &dyn Record,
    cache: &mut SizeCache,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    match encode_unmetered(record, cache, out) {
        Ok(size) => {
            ENCODE.click();
            ENCODE_BYTES.count(size as u64);
            Ok(())
        }
        Err(err) => {
            ENCODE_ERROR.click();
            Err(err)
        }
    }
}

fn encode_unmetered(
    record: &dyn Record,
    cache: &mut SizeCache,
    out: &mut Vec<u8>,
) -> Result<usize, Error> {
    cache.clear();
    sizer::compute_size(record, cache, 0)?;
    let size = cache.get(0)?;
    out.reserve(size);
    encoder::encode(record, out, cache, 0)?;
    Ok(size)
}

/// Encode `record` and write it to `writer`, returning the number of bytes written.  Codec errors
/// surface as [std::io::ErrorKind::InvalidData].
pub fn encode_to<W: std::io::Write>(
    record: &dyn Record,
    writer: &mut W,
) -> std::io::Result<usize> {
    let buf = encode(record)?;
    writer.write_all(&buf)?;
    Ok(buf.len())
}

/// Decode `buf` into a new record of type `R`.
pub fn decode<R: Record + Default>(buf: &[u8]) -> Result<R, Error> {
    let mut record = R::default();
    decode_into(buf, &mut record)?;
    Ok(record)
}

/// Decode `buf` into `record`, merging with any fields already set.
pub fn decode_into(buf: &[u8], record: &mut dyn Record) -> Result<(), Error> {
    let mut input = wiretk::Input::new(buf);
    match decoder::decode_from(&mut input, record) {
        Ok(()) => {
            DECODE.click();
            DECODE_BYTES.count(buf.len() as u64);
            Ok(())
        }
        Err(err) => {
            DECODE_ERROR.click();
            Err(err)
        }
    }
}

/// Read all of `reader` and decode it into `record`.
pub fn decode_from_reader<R: std::io::Read>(
    reader: &mut R,
    record: &mut dyn Record,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode_into(&buf, record)?;
    Ok(())
}
