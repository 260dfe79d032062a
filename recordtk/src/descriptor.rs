//! Static descriptions of record schemas.
//!
//! A [RecordDescriptor] is built once, in a `static`, and shared by every record of its type.
//! Descriptors may refer to themselves or to each other, so a recursive schema is written as a
//! pair of statics:
//!
//! ```
//! use recordtk::{FieldDescriptor, RecordDescriptor, ScalarType};
//!
//! static TREE_FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::scalar(1, "label", ScalarType::String),
//!     FieldDescriptor::messages(2, "children", &TREE),
//! ];
//! static TREE: RecordDescriptor = RecordDescriptor::new("Tree", &TREE_FIELDS);
//!
//! assert_eq!(Some("children"), TREE.field(2).map(|f| f.name()));
//! ```

use std::fmt::{Debug, Formatter};

use wiretk::{tag_size, FieldNumber, Tag, WireType};

//////////////////////////////////////////// ScalarType ////////////////////////////////////////////

/// The scalar types a field may carry.  Signed integers are plain two's-complement varints; there
/// is no zigzag encoding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarType {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
    Float,
    Double,
    Fixed32,
    Fixed64,
    String,
    Bytes,
    /// Seconds and nanoseconds, carried as a length-delimited [crate::Timestamp].
    Timestamp,
}

impl ScalarType {
    /// The wire type a single value of this type travels as.
    pub const fn wire_type(&self) -> WireType {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::UInt32
            | ScalarType::UInt64
            | ScalarType::Bool => WireType::Varint,
            ScalarType::Float | ScalarType::Fixed32 => WireType::ThirtyTwo,
            ScalarType::Double | ScalarType::Fixed64 => WireType::SixtyFour,
            ScalarType::String | ScalarType::Bytes | ScalarType::Timestamp => {
                WireType::LengthDelimited
            }
        }
    }

    /// Lists of packable types are written as one length-delimited block.  Everything
    /// length-delimited is written one element per tag instead.
    pub const fn is_packable(&self) -> bool {
        !matches!(
            self,
            ScalarType::String | ScalarType::Bytes | ScalarType::Timestamp
        )
    }
}

///////////////////////////////////////////// Presence /////////////////////////////////////////////

/// How a singular scalar decides whether to appear on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Presence {
    /// Written whenever the value differs from its type's default.
    Implicit,
    /// Written whenever the value is set, even to the default.
    Explicit,
}

///////////////////////////////////////////// FieldKind ////////////////////////////////////////////

/// The shape of a field.  Map keys are always strings.
#[derive(Clone, Copy, Eq, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarType, Presence),
    ScalarList(ScalarType),
    ScalarMap(ScalarType),
    Message(&'static RecordDescriptor),
    MessageList(&'static RecordDescriptor),
    MessageMap(&'static RecordDescriptor),
}

impl FieldKind {
    /// The scalar type of a scalar, scalar list, or scalar map field.
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            FieldKind::Scalar(ty, _) | FieldKind::ScalarList(ty) | FieldKind::ScalarMap(ty) => {
                Some(*ty)
            }
            _ => None,
        }
    }

    /// The descriptor of the nested record for message-typed fields.
    pub const fn record(&self) -> Option<&'static RecordDescriptor> {
        match self {
            FieldKind::Message(r) | FieldKind::MessageList(r) | FieldKind::MessageMap(r) => {
                Some(*r)
            }
            _ => None,
        }
    }
}

impl Debug for FieldKind {
    // Nested descriptors print by name; printing them whole would not terminate on recursive
    // schemas.
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            FieldKind::Scalar(ty, presence) => write!(fmt, "Scalar({:?}, {:?})", ty, presence),
            FieldKind::ScalarList(ty) => write!(fmt, "ScalarList({:?})", ty),
            FieldKind::ScalarMap(ty) => write!(fmt, "ScalarMap({:?})", ty),
            FieldKind::Message(r) => write!(fmt, "Message({})", r.name()),
            FieldKind::MessageList(r) => write!(fmt, "MessageList({})", r.name()),
            FieldKind::MessageMap(r) => write!(fmt, "MessageMap({})", r.name()),
        }
    }
}

////////////////////////////////////////// FieldDescriptor /////////////////////////////////////////

/// One field of a record:  its number on the wire, its name, and its kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    number: FieldNumber,
    name: &'static str,
    kind: FieldKind,
}

impl FieldDescriptor {
    /// A field of any kind.  Panics, at compile time when used in a static, if `number` is not a
    /// valid field number.
    pub const fn new(number: u32, name: &'static str, kind: FieldKind) -> Self {
        Self {
            number: FieldNumber::must(number),
            name,
            kind,
        }
    }

    /// A singular scalar with implicit presence.
    pub const fn scalar(number: u32, name: &'static str, ty: ScalarType) -> Self {
        Self::new(number, name, FieldKind::Scalar(ty, Presence::Implicit))
    }

    /// A singular scalar with explicit presence.
    pub const fn optional(number: u32, name: &'static str, ty: ScalarType) -> Self {
        Self::new(number, name, FieldKind::Scalar(ty, Presence::Explicit))
    }

    /// A repeated scalar.
    pub const fn list(number: u32, name: &'static str, ty: ScalarType) -> Self {
        Self::new(number, name, FieldKind::ScalarList(ty))
    }

    /// A map from string to scalar.
    pub const fn map(number: u32, name: &'static str, ty: ScalarType) -> Self {
        Self::new(number, name, FieldKind::ScalarMap(ty))
    }

    /// A singular nested record.
    pub const fn message(number: u32, name: &'static str, r: &'static RecordDescriptor) -> Self {
        Self::new(number, name, FieldKind::Message(r))
    }

    /// A repeated nested record.
    pub const fn messages(number: u32, name: &'static str, r: &'static RecordDescriptor) -> Self {
        Self::new(number, name, FieldKind::MessageList(r))
    }

    /// A map from string to nested record.
    pub const fn message_map(
        number: u32,
        name: &'static str,
        r: &'static RecordDescriptor,
    ) -> Self {
        Self::new(number, name, FieldKind::MessageMap(r))
    }

    pub const fn number(&self) -> u32 {
        self.number.get()
    }

    pub const fn field_number(&self) -> FieldNumber {
        self.number
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    pub const fn scalar_type(&self) -> Option<ScalarType> {
        self.kind.scalar_type()
    }

    /// The wire type this field's tag carries.  Lists, maps, and messages are always
    /// length-delimited; a list of strings or bytes repeats the tag per element, which is also
    /// length-delimited.
    pub const fn wire_type(&self) -> WireType {
        match self.kind {
            FieldKind::Scalar(ty, _) => ty.wire_type(),
            _ => WireType::LengthDelimited,
        }
    }

    pub const fn tag(&self) -> Tag {
        Tag::new(self.number, self.wire_type())
    }

    pub const fn tag_size(&self) -> usize {
        tag_size(self.number)
    }
}

///////////////////////////////////////// RecordDescriptor /////////////////////////////////////////

/// The schema of one record type.  Two descriptors are equal only if they are the same static.
pub struct RecordDescriptor {
    name: &'static str,
    fields: &'static [FieldDescriptor],
}

impl RecordDescriptor {
    /// Describe a record.  Fields must be listed in strictly ascending order of field number.
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        let mut idx = 1;
        while idx < fields.len() {
            assert!(
                fields[idx - 1].number.get() < fields[idx].number.get(),
                "fields must be in strictly ascending order of field number"
            );
            idx += 1;
        }
        Self { name, fields }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// All fields, ascending by field number.  Encoding follows this order.
    pub const fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<&'static FieldDescriptor> {
        self.position(number).map(|idx| &self.fields[idx])
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The index into [RecordDescriptor::fields] of the field with the given number.
    pub fn position(&self, number: u32) -> Option<usize> {
        self.fields
            .binary_search_by_key(&number, |f| f.number.get())
            .ok()
    }
}

impl PartialEq for RecordDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for RecordDescriptor {}

impl Debug for RecordDescriptor {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        fmt.debug_struct("RecordDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////
