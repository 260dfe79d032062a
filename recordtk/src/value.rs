//! Scalar values, borrowed and owned.
//!
//! Records hand out [Scalar] and [ScalarList] views of their fields; the encoder never takes
//! ownership of record data.  [Value] and [ListValue] are the owned counterparts used by
//! [crate::DynamicRecord].

use wiretk::{tag_size, v64, varint_size, FieldNumber, Input, Packable, Tag};

use super::{Error, FieldDescriptor, ScalarType, Timestamp};

////////////////////////////////////////////// Scalar //////////////////////////////////////////////

/// A borrowed scalar value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar<'a> {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Fixed32(u32),
    Fixed64(u64),
    String(&'a str),
    Bytes(&'a [u8]),
    Timestamp(Timestamp),
}

impl<'a> Scalar<'a> {
    /// The default value of `ty`:  zero, false, or empty.
    pub const fn default_for(ty: ScalarType) -> Scalar<'static> {
        match ty {
            ScalarType::Int32 => Scalar::Int32(0),
            ScalarType::Int64 => Scalar::Int64(0),
            ScalarType::UInt32 => Scalar::UInt32(0),
            ScalarType::UInt64 => Scalar::UInt64(0),
            ScalarType::Bool => Scalar::Bool(false),
            ScalarType::Float => Scalar::Float(0.0),
            ScalarType::Double => Scalar::Double(0.0),
            ScalarType::Fixed32 => Scalar::Fixed32(0),
            ScalarType::Fixed64 => Scalar::Fixed64(0),
            ScalarType::String => Scalar::String(""),
            ScalarType::Bytes => Scalar::Bytes(&[]),
            ScalarType::Timestamp => Scalar::Timestamp(Timestamp::EPOCH),
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Int32(_) => ScalarType::Int32,
            Scalar::Int64(_) => ScalarType::Int64,
            Scalar::UInt32(_) => ScalarType::UInt32,
            Scalar::UInt64(_) => ScalarType::UInt64,
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::Float(_) => ScalarType::Float,
            Scalar::Double(_) => ScalarType::Double,
            Scalar::Fixed32(_) => ScalarType::Fixed32,
            Scalar::Fixed64(_) => ScalarType::Fixed64,
            Scalar::String(_) => ScalarType::String,
            Scalar::Bytes(_) => ScalarType::Bytes,
            Scalar::Timestamp(_) => ScalarType::Timestamp,
        }
    }

    /// True for zero, false, and empty.  Floating point compares bitwise, so negative zero is not
    /// a default.
    pub fn is_default(&self) -> bool {
        match self {
            Scalar::Int32(x) => *x == 0,
            Scalar::Int64(x) => *x == 0,
            Scalar::UInt32(x) | Scalar::Fixed32(x) => *x == 0,
            Scalar::UInt64(x) | Scalar::Fixed64(x) => *x == 0,
            Scalar::Bool(x) => !*x,
            Scalar::Float(x) => x.to_bits() == 0,
            Scalar::Double(x) => x.to_bits() == 0,
            Scalar::String(x) => x.is_empty(),
            Scalar::Bytes(x) => x.is_empty(),
            Scalar::Timestamp(x) => x.is_epoch(),
        }
    }

    /// Bytes the value takes on the wire, without a tag.
    pub fn payload_size(&self) -> usize {
        match self {
            Scalar::Int32(x) => varint_size(*x as i64 as u64),
            Scalar::Int64(x) => varint_size(*x as u64),
            Scalar::UInt32(x) => varint_size(*x as u64),
            Scalar::UInt64(x) => varint_size(*x),
            Scalar::Bool(_) => 1,
            Scalar::Float(x) => x.pack_sz(),
            Scalar::Double(x) => x.pack_sz(),
            Scalar::Fixed32(x) => x.pack_sz(),
            Scalar::Fixed64(x) => x.pack_sz(),
            Scalar::String(x) => x.pack_sz(),
            Scalar::Bytes(x) => x.pack_sz(),
            Scalar::Timestamp(x) => x.pack_sz(),
        }
    }

    /// Append the value, without a tag.
    pub fn pack_payload(&self, out: &mut Vec<u8>) {
        match self {
            Scalar::Int32(x) => v64::from(*x).pack(out),
            Scalar::Int64(x) => v64::from(*x).pack(out),
            Scalar::UInt32(x) => v64::from(*x).pack(out),
            Scalar::UInt64(x) => v64::from(*x).pack(out),
            Scalar::Bool(x) => out.push(*x as u8),
            Scalar::Float(x) => x.pack(out),
            Scalar::Double(x) => x.pack(out),
            Scalar::Fixed32(x) => x.pack(out),
            Scalar::Fixed64(x) => x.pack(out),
            Scalar::String(x) => x.pack(out),
            Scalar::Bytes(x) => x.pack(out),
            Scalar::Timestamp(x) => x.pack(out),
        }
    }

    /// Bytes the value takes on the wire behind a tag for `number`.
    pub fn field_size(&self, number: FieldNumber) -> usize {
        tag_size(number) + self.payload_size()
    }

    /// Append a tag for `number` and then the value.
    pub fn pack_field(&self, number: FieldNumber, out: &mut Vec<u8>) {
        Tag::new(number, self.scalar_type().wire_type()).pack(out);
        self.pack_payload(out);
    }

    /// Read one value of type `ty`.  The caller has already checked the wire type.  Varints read
    /// into 32-bit types keep their low 32 bits.
    pub fn read(ty: ScalarType, input: &mut Input<'a>) -> Result<Scalar<'a>, Error> {
        Ok(match ty {
            ScalarType::Int32 => Scalar::Int32(input.read_varint32()? as i32),
            ScalarType::Int64 => Scalar::Int64(input.read_varint64()? as i64),
            ScalarType::UInt32 => Scalar::UInt32(input.read_varint32()?),
            ScalarType::UInt64 => Scalar::UInt64(input.read_varint64()?),
            ScalarType::Bool => Scalar::Bool(input.read_bool()?),
            ScalarType::Float => Scalar::Float(input.read_float()?),
            ScalarType::Double => Scalar::Double(input.read_double()?),
            ScalarType::Fixed32 => Scalar::Fixed32(input.read_fixed32()?),
            ScalarType::Fixed64 => Scalar::Fixed64(input.read_fixed64()?),
            ScalarType::String => Scalar::String(input.read_str()?),
            ScalarType::Bytes => Scalar::Bytes(input.read_length_delimited()?),
            ScalarType::Timestamp => Scalar::Timestamp(Timestamp::read(input)?),
        })
    }

    /// Convert to a Rust type, reporting a type mismatch against `field` on failure.
    pub fn extract<T: FromScalar>(self, field: &FieldDescriptor) -> Result<T, Error> {
        let got = self.scalar_type();
        T::from_scalar(self).ok_or(Error::TypeMismatch {
            field: field.name(),
            expected: field.scalar_type().unwrap_or(got),
            got,
        })
    }

    pub fn to_value(&self) -> Value {
        match *self {
            Scalar::Int32(x) => Value::Int32(x),
            Scalar::Int64(x) => Value::Int64(x),
            Scalar::UInt32(x) => Value::UInt32(x),
            Scalar::UInt64(x) => Value::UInt64(x),
            Scalar::Bool(x) => Value::Bool(x),
            Scalar::Float(x) => Value::Float(x),
            Scalar::Double(x) => Value::Double(x),
            Scalar::Fixed32(x) => Value::Fixed32(x),
            Scalar::Fixed64(x) => Value::Fixed64(x),
            Scalar::String(x) => Value::String(x.to_owned()),
            Scalar::Bytes(x) => Value::Bytes(x.to_vec()),
            Scalar::Timestamp(x) => Value::Timestamp(x),
        }
    }
}

//////////////////////////////////////////// FromScalar ////////////////////////////////////////////

/// Rust types a [Scalar] converts into.  Unsigned integers accept both the varint and the fixed
/// encodings.  Integers narrower than 32 bits travel as `Int32` and keep its low bits.
pub trait FromScalar: Sized {
    fn from_scalar(value: Scalar<'_>) -> Option<Self>;
}

macro_rules! from_scalar {
    ($what:ty, $($variant:ident)|+) => {
        impl FromScalar for $what {
            fn from_scalar(value: Scalar<'_>) -> Option<Self> {
                match value {
                    $(Scalar::$variant(x) => Some(x),)+
                    _ => None,
                }
            }
        }
    };
}

from_scalar!(i32, Int32);
from_scalar!(i64, Int64);
from_scalar!(u32, UInt32 | Fixed32);
from_scalar!(u64, UInt64 | Fixed64);
from_scalar!(bool, Bool);
from_scalar!(f32, Float);
from_scalar!(f64, Double);
from_scalar!(Timestamp, Timestamp);

macro_rules! from_int32 {
    ($what:ty) => {
        impl FromScalar for $what {
            fn from_scalar(value: Scalar<'_>) -> Option<Self> {
                match value {
                    Scalar::Int32(x) => Some(x as $what),
                    _ => None,
                }
            }
        }
    };
}

from_int32!(i16);
from_int32!(u16);
from_int32!(i8);
from_int32!(u8);

impl FromScalar for String {
    fn from_scalar(value: Scalar<'_>) -> Option<Self> {
        match value {
            Scalar::String(x) => Some(x.to_owned()),
            _ => None,
        }
    }
}

impl FromScalar for Vec<u8> {
    fn from_scalar(value: Scalar<'_>) -> Option<Self> {
        match value {
            Scalar::Bytes(x) => Some(x.to_vec()),
            _ => None,
        }
    }
}

//////////////////////////////////////////// ScalarList ////////////////////////////////////////////

/// A borrowed list of scalars, all of one type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarList<'a> {
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Bool(&'a [bool]),
    Float(&'a [f32]),
    Double(&'a [f64]),
    Fixed32(&'a [u32]),
    Fixed64(&'a [u64]),
    String(&'a [String]),
    Bytes(&'a [Vec<u8>]),
    Timestamp(&'a [Timestamp]),
}

impl<'a> ScalarList<'a> {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarList::Int32(_) => ScalarType::Int32,
            ScalarList::Int64(_) => ScalarType::Int64,
            ScalarList::UInt32(_) => ScalarType::UInt32,
            ScalarList::UInt64(_) => ScalarType::UInt64,
            ScalarList::Bool(_) => ScalarType::Bool,
            ScalarList::Float(_) => ScalarType::Float,
            ScalarList::Double(_) => ScalarType::Double,
            ScalarList::Fixed32(_) => ScalarType::Fixed32,
            ScalarList::Fixed64(_) => ScalarType::Fixed64,
            ScalarList::String(_) => ScalarType::String,
            ScalarList::Bytes(_) => ScalarType::Bytes,
            ScalarList::Timestamp(_) => ScalarType::Timestamp,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ScalarList::Int32(x) => x.len(),
            ScalarList::Int64(x) => x.len(),
            ScalarList::UInt32(x) | ScalarList::Fixed32(x) => x.len(),
            ScalarList::UInt64(x) | ScalarList::Fixed64(x) => x.len(),
            ScalarList::Bool(x) => x.len(),
            ScalarList::Float(x) => x.len(),
            ScalarList::Double(x) => x.len(),
            ScalarList::String(x) => x.len(),
            ScalarList::Bytes(x) => x.len(),
            ScalarList::Timestamp(x) => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<Scalar<'a>> {
        match *self {
            ScalarList::Int32(x) => x.get(idx).copied().map(Scalar::Int32),
            ScalarList::Int64(x) => x.get(idx).copied().map(Scalar::Int64),
            ScalarList::UInt32(x) => x.get(idx).copied().map(Scalar::UInt32),
            ScalarList::UInt64(x) => x.get(idx).copied().map(Scalar::UInt64),
            ScalarList::Bool(x) => x.get(idx).copied().map(Scalar::Bool),
            ScalarList::Float(x) => x.get(idx).copied().map(Scalar::Float),
            ScalarList::Double(x) => x.get(idx).copied().map(Scalar::Double),
            ScalarList::Fixed32(x) => x.get(idx).copied().map(Scalar::Fixed32),
            ScalarList::Fixed64(x) => x.get(idx).copied().map(Scalar::Fixed64),
            ScalarList::String(x) => x.get(idx).map(|s| Scalar::String(s.as_str())),
            ScalarList::Bytes(x) => x.get(idx).map(|b| Scalar::Bytes(b.as_slice())),
            ScalarList::Timestamp(x) => x.get(idx).copied().map(Scalar::Timestamp),
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Scalar<'a>> + 'a {
        (0..self.len()).filter_map(move |idx| self.get(idx))
    }

    /// Sum of the element payload sizes.  For a packable list this is the length prefix of the
    /// packed block.
    pub fn payload_size(&self) -> usize {
        self.iter().map(|s| s.payload_size()).sum()
    }
}

/////////////////////////////////////////////// Value //////////////////////////////////////////////

/// An owned scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Fixed32(u32),
    Fixed64(u64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(Timestamp),
}

impl Value {
    pub fn default_for(ty: ScalarType) -> Value {
        Scalar::default_for(ty).to_value()
    }

    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            Value::Int32(x) => Scalar::Int32(*x),
            Value::Int64(x) => Scalar::Int64(*x),
            Value::UInt32(x) => Scalar::UInt32(*x),
            Value::UInt64(x) => Scalar::UInt64(*x),
            Value::Bool(x) => Scalar::Bool(*x),
            Value::Float(x) => Scalar::Float(*x),
            Value::Double(x) => Scalar::Double(*x),
            Value::Fixed32(x) => Scalar::Fixed32(*x),
            Value::Fixed64(x) => Scalar::Fixed64(*x),
            Value::String(x) => Scalar::String(x),
            Value::Bytes(x) => Scalar::Bytes(x),
            Value::Timestamp(x) => Scalar::Timestamp(*x),
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.as_scalar().scalar_type()
    }

    /// Reinterpret an unsigned integer as its fixed-width twin, or the reverse, so that `u32` and
    /// `u64` can be stored into either kind of field.  Other values are returned unchanged.
    pub fn coerce(self, ty: ScalarType) -> Value {
        match (self, ty) {
            (Value::UInt32(x), ScalarType::Fixed32) => Value::Fixed32(x),
            (Value::Fixed32(x), ScalarType::UInt32) => Value::UInt32(x),
            (Value::UInt64(x), ScalarType::Fixed64) => Value::Fixed64(x),
            (Value::Fixed64(x), ScalarType::UInt64) => Value::UInt64(x),
            (value, _) => value,
        }
    }
}

macro_rules! value_from {
    ($what:ty, $variant:ident) => {
        impl From<$what> for Value {
            fn from(x: $what) -> Value {
                Value::$variant(x)
            }
        }
    };
}

value_from!(i32, Int32);
value_from!(i64, Int64);
value_from!(u32, UInt32);
value_from!(u64, UInt64);
value_from!(bool, Bool);
value_from!(f32, Float);
value_from!(f64, Double);
value_from!(String, String);
value_from!(Vec<u8>, Bytes);
value_from!(Timestamp, Timestamp);

impl From<&str> for Value {
    fn from(x: &str) -> Value {
        Value::String(x.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(x: &[u8]) -> Value {
        Value::Bytes(x.to_vec())
    }
}

impl From<Scalar<'_>> for Value {
    fn from(x: Scalar<'_>) -> Value {
        x.to_value()
    }
}

///////////////////////////////////////////// ListValue ////////////////////////////////////////////

/// An owned list of scalars, all of one type.
#[derive(Clone, Debug, PartialEq)]
pub enum ListValue {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Bool(Vec<bool>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Fixed32(Vec<u32>),
    Fixed64(Vec<u64>),
    String(Vec<String>),
    Bytes(Vec<Vec<u8>>),
    Timestamp(Vec<Timestamp>),
}

impl ListValue {
    /// An empty list of `ty`.
    pub fn new(ty: ScalarType) -> Self {
        match ty {
            ScalarType::Int32 => ListValue::Int32(Vec::new()),
            ScalarType::Int64 => ListValue::Int64(Vec::new()),
            ScalarType::UInt32 => ListValue::UInt32(Vec::new()),
            ScalarType::UInt64 => ListValue::UInt64(Vec::new()),
            ScalarType::Bool => ListValue::Bool(Vec::new()),
            ScalarType::Float => ListValue::Float(Vec::new()),
            ScalarType::Double => ListValue::Double(Vec::new()),
            ScalarType::Fixed32 => ListValue::Fixed32(Vec::new()),
            ScalarType::Fixed64 => ListValue::Fixed64(Vec::new()),
            ScalarType::String => ListValue::String(Vec::new()),
            ScalarType::Bytes => ListValue::Bytes(Vec::new()),
            ScalarType::Timestamp => ListValue::Timestamp(Vec::new()),
        }
    }

    pub fn as_list(&self) -> ScalarList<'_> {
        match self {
            ListValue::Int32(x) => ScalarList::Int32(x),
            ListValue::Int64(x) => ScalarList::Int64(x),
            ListValue::UInt32(x) => ScalarList::UInt32(x),
            ListValue::UInt64(x) => ScalarList::UInt64(x),
            ListValue::Bool(x) => ScalarList::Bool(x),
            ListValue::Float(x) => ScalarList::Float(x),
            ListValue::Double(x) => ScalarList::Double(x),
            ListValue::Fixed32(x) => ScalarList::Fixed32(x),
            ListValue::Fixed64(x) => ScalarList::Fixed64(x),
            ListValue::String(x) => ScalarList::String(x),
            ListValue::Bytes(x) => ScalarList::Bytes(x),
            ListValue::Timestamp(x) => ScalarList::Timestamp(x),
        }
    }

    pub fn len(&self) -> usize {
        self.as_list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `value`, which must match the list's type.
    pub fn push(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match (self, value) {
            (ListValue::Int32(v), Scalar::Int32(x)) => v.push(x),
            (ListValue::Int64(v), Scalar::Int64(x)) => v.push(x),
            (ListValue::UInt32(v), Scalar::UInt32(x)) => v.push(x),
            (ListValue::UInt64(v), Scalar::UInt64(x)) => v.push(x),
            (ListValue::Bool(v), Scalar::Bool(x)) => v.push(x),
            (ListValue::Float(v), Scalar::Float(x)) => v.push(x),
            (ListValue::Double(v), Scalar::Double(x)) => v.push(x),
            (ListValue::Fixed32(v), Scalar::Fixed32(x)) => v.push(x),
            (ListValue::Fixed64(v), Scalar::Fixed64(x)) => v.push(x),
            (ListValue::String(v), Scalar::String(x)) => v.push(x.to_owned()),
            (ListValue::Bytes(v), Scalar::Bytes(x)) => v.push(x.to_vec()),
            (ListValue::Timestamp(v), Scalar::Timestamp(x)) => v.push(x),
            (list, value) => {
                return Err(Error::TypeMismatch {
                    field: field.name(),
                    expected: list.as_list().scalar_type(),
                    got: value.scalar_type(),
                });
            }
        }
        Ok(())
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
