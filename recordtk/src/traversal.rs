//! The single walk over a record that both the size pass and the encode pass share.  Keeping one
//! walk is what keeps the two passes in lockstep:  they see the same fields, in the same order,
//! with the same presence decisions, so the nth nested record one pass reaches is the nth the
//! other reaches.

use super::{
    Error, FieldDescriptor, FieldKind, Presence, Record, RecordDescriptor, Scalar, ScalarList,
    ScalarType,
};

/// Callbacks for each field the walk decides to emit.
pub(crate) trait Visitor {
    fn scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error>;
    /// Only called for non-empty lists.
    fn scalar_list(&mut self, field: &FieldDescriptor, list: ScalarList<'_>) -> Result<(), Error>;
    fn message(&mut self, field: &FieldDescriptor, child: &dyn Record) -> Result<(), Error>;
    fn scalar_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        value: Scalar<'_>,
    ) -> Result<(), Error>;
    fn message_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        child: &dyn Record,
    ) -> Result<(), Error>;
}

/// Visit every field of `record` that belongs on the wire, in ascending field-number order.
pub(crate) fn walk<V: Visitor>(record: &dyn Record, visitor: &mut V) -> Result<(), Error> {
    for field in record.descriptor().fields() {
        match field.kind() {
            FieldKind::Scalar(ty, presence) => {
                if let Some(value) = record.scalar(field) {
                    check_type(field, ty, value.scalar_type())?;
                    if presence == Presence::Explicit || !value.is_default() {
                        visitor.scalar(field, value)?;
                    }
                }
            }
            FieldKind::ScalarList(ty) => {
                if let Some(list) = record.scalar_list(field) {
                    check_type(field, ty, list.scalar_type())?;
                    if !list.is_empty() {
                        visitor.scalar_list(field, list)?;
                    }
                }
            }
            FieldKind::ScalarMap(ty) => {
                record.visit_scalar_entries(field, &mut |key, value| {
                    check_type(field, ty, value.scalar_type())?;
                    visitor.scalar_entry(field, key, value)
                })?;
            }
            FieldKind::Message(expected) => {
                if let Some(child) = record.message(field) {
                    check_record(field, expected, child)?;
                    visitor.message(field, child)?;
                }
            }
            FieldKind::MessageList(expected) => {
                record.visit_messages(field, &mut |child| {
                    check_record(field, expected, child)?;
                    visitor.message(field, child)
                })?;
            }
            FieldKind::MessageMap(expected) => {
                record.visit_message_entries(field, &mut |key, child| {
                    check_record(field, expected, child)?;
                    visitor.message_entry(field, key, child)
                })?;
            }
        }
    }
    Ok(())
}

fn check_type(field: &FieldDescriptor, expected: ScalarType, got: ScalarType) -> Result<(), Error> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: field.name(),
            expected,
            got,
        })
    }
}

fn check_record(
    field: &FieldDescriptor,
    expected: &'static RecordDescriptor,
    child: &dyn Record,
) -> Result<(), Error> {
    let got = child.descriptor();
    if expected == got {
        Ok(())
    } else {
        Err(Error::DescriptorMismatch {
            field: field.name(),
            expected: expected.name(),
            got: got.name(),
        })
    }
}
