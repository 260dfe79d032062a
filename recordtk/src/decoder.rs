//! Decode records from the wire.
//!
//! Decoding is a single forward pass.  Each nested message is read between a pushed and a popped
//! limit, so a message that ends early or runs long is an error rather than a silent
//! resynchronization.  Unknown fields are skipped according to their wire type.  Messages may nest
//! at most [DEFAULT_RECURSION_LIMIT] levels deep unless a caller picks another limit with
//! [decode_with_limit].

use wiretk::{Input, Tag, WireType};

use super::sizer::{MAP_KEY, MAP_VALUE};
use super::{Error, FieldDescriptor, FieldKind, Record, Scalar, ScalarType, UNKNOWN_FIELD};

/// How many levels of nested messages [decode_from] will descend into.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Decode fields from `input` into `record` until the input reaches its limit.  Fields already
/// set on `record` are merged with:  scalars are replaced, lists are appended to, map entries
/// are replaced by key, and each occurrence of a singular message is decoded into a fresh record
/// that replaces the previous one.
pub fn decode_from<'a>(input: &mut Input<'a>, record: &mut dyn Record) -> Result<(), Error> {
    decode_with_limit(input, record, DEFAULT_RECURSION_LIMIT)
}

/// Like [decode_from], but fail with [Error::RecursionLimit] once messages nest more than `limit`
/// levels below `record`.
pub fn decode_with_limit<'a>(
    input: &mut Input<'a>,
    record: &mut dyn Record,
    limit: usize,
) -> Result<(), Error> {
    decode_fields(input, record, Depth { limit, left: limit })
}

#[derive(Clone, Copy)]
struct Depth {
    limit: usize,
    left: usize,
}

impl Depth {
    fn descend(self) -> Result<Depth, Error> {
        match self.left.checked_sub(1) {
            Some(left) => Ok(Depth {
                limit: self.limit,
                left,
            }),
            None => Err(Error::RecursionLimit { limit: self.limit }),
        }
    }
}

fn decode_fields<'a>(
    input: &mut Input<'a>,
    record: &mut dyn Record,
    depth: Depth,
) -> Result<(), Error> {
    let descriptor = record.descriptor();
    while !input.at_limit() {
        let tag = input.read_tag()?;
        let field = match descriptor.field(tag.field_number.get()) {
            Some(field) => field,
            None => {
                UNKNOWN_FIELD.click();
                input.skip_field(tag.wire_type)?;
                continue;
            }
        };
        match field.kind() {
            FieldKind::Scalar(ty, _) => {
                expect_wire_type(record, field, tag, ty.wire_type())?;
                let value = Scalar::read(ty, input)?;
                record.set_scalar(field, value)?;
            }
            FieldKind::ScalarList(ty) => {
                if ty.is_packable() && tag.wire_type == WireType::LengthDelimited {
                    let len = input.read_length()?;
                    let saved = input.push_limit(len)?;
                    while !input.at_limit() {
                        let value = Scalar::read(ty, input)?;
                        record.push_scalar(field, value)?;
                    }
                    input.pop_limit(saved)?;
                } else {
                    expect_wire_type(record, field, tag, ty.wire_type())?;
                    let value = Scalar::read(ty, input)?;
                    record.push_scalar(field, value)?;
                }
            }
            FieldKind::ScalarMap(ty) => {
                expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
                decode_scalar_entry(input, record, field, ty)?;
            }
            FieldKind::Message(_) => {
                expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
                decode_nested(input, record.replace_message(field)?, depth)?;
            }
            FieldKind::MessageList(_) => {
                expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
                decode_nested(input, record.push_message(field)?, depth)?;
            }
            FieldKind::MessageMap(_) => {
                expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
                decode_message_entry(input, record, field, depth)?;
            }
        }
    }
    Ok(())
}

fn decode_nested(
    input: &mut Input<'_>,
    child: &mut dyn Record,
    depth: Depth,
) -> Result<(), Error> {
    let depth = depth.descend()?;
    let len = input.read_length()?;
    let saved = input.push_limit(len)?;
    decode_fields(input, child, depth)?;
    input.pop_limit(saved)?;
    Ok(())
}

// Map entries accept their key and value in either order, skip sub-fields they do not know, and
// fill a missing key or value with its default.
fn decode_scalar_entry<'a>(
    input: &mut Input<'a>,
    record: &mut dyn Record,
    field: &FieldDescriptor,
    ty: ScalarType,
) -> Result<(), Error> {
    let len = input.read_length()?;
    let saved = input.push_limit(len)?;
    let mut key = "";
    let mut value = None;
    while !input.at_limit() {
        let tag = input.read_tag()?;
        if tag.field_number == MAP_KEY {
            expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
            key = input.read_str()?;
        } else if tag.field_number == MAP_VALUE {
            expect_wire_type(record, field, tag, ty.wire_type())?;
            value = Some(Scalar::read(ty, input)?);
        } else {
            input.skip_field(tag.wire_type)?;
        }
    }
    input.pop_limit(saved)?;
    let value = value.unwrap_or(Scalar::default_for(ty));
    record.insert_scalar(field, key, value)
}

fn decode_message_entry<'a>(
    input: &mut Input<'a>,
    record: &mut dyn Record,
    field: &FieldDescriptor,
    depth: Depth,
) -> Result<(), Error> {
    let depth = depth.descend()?;
    let len = input.read_length()?;
    let saved = input.push_limit(len)?;
    let mut key = "";
    let mut payload: &'a [u8] = &[];
    while !input.at_limit() {
        let tag = input.read_tag()?;
        if tag.field_number == MAP_KEY {
            expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
            key = input.read_str()?;
        } else if tag.field_number == MAP_VALUE {
            expect_wire_type(record, field, tag, WireType::LengthDelimited)?;
            payload = input.read_length_delimited()?;
        } else {
            input.skip_field(tag.wire_type)?;
        }
    }
    input.pop_limit(saved)?;
    // The value may precede the key, so it is decoded only once the entry is complete.
    let child = record.insert_message(field, key)?;
    decode_fields(&mut Input::new(payload), child, depth)
}

fn expect_wire_type(
    record: &dyn Record,
    field: &FieldDescriptor,
    tag: Tag,
    expected: WireType,
) -> Result<(), Error> {
    if tag.wire_type == expected {
        Ok(())
    } else {
        Err(Error::WrongWireType {
            record: record.descriptor().name(),
            field: field.name(),
            expected,
            got: tag.wire_type,
        })
    }
}
