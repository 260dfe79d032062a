use super::{Error, FieldDescriptor, RecordDescriptor, Scalar, ScalarList};

/// A value the codec can size, encode, and decode.
///
/// The read half exposes each field in a form the encoder can walk without copying; the write
/// half receives decoded values one at a time.  Every method has a default that reports the field
/// as absent (reads) or unsupported (writes), so an implementation only overrides the methods for
/// the kinds of field its descriptor actually has.  The `field` argument is always one of
/// `self.descriptor().fields()`.
pub trait Record {
    /// The schema of this record.  Must return the same static for every value of the type.
    fn descriptor(&self) -> &'static RecordDescriptor;

    /// The value of a singular scalar field, or `None` when it is not set.
    fn scalar(&self, _field: &FieldDescriptor) -> Option<Scalar<'_>> {
        None
    }

    /// The elements of a repeated scalar field.
    fn scalar_list(&self, _field: &FieldDescriptor) -> Option<ScalarList<'_>> {
        None
    }

    /// The value of a singular message field, or `None` when it is not set.
    fn message(&self, _field: &FieldDescriptor) -> Option<&dyn Record> {
        None
    }

    /// Call `visit` on each element of a repeated message field, in order.
    fn visit_messages(
        &self,
        _field: &FieldDescriptor,
        _visit: &mut dyn FnMut(&dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Call `visit` on each entry of a scalar-valued map.  Entries are written in the order they
    /// are visited.
    fn visit_scalar_entries(
        &self,
        _field: &FieldDescriptor,
        _visit: &mut dyn FnMut(&str, Scalar<'_>) -> Result<(), Error>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Call `visit` on each entry of a message-valued map.
    fn visit_message_entries(
        &self,
        _field: &FieldDescriptor,
        _visit: &mut dyn FnMut(&str, &dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Store a decoded singular scalar.  A later value for the same field replaces an earlier
    /// one.
    fn set_scalar(&mut self, field: &FieldDescriptor, _value: Scalar<'_>) -> Result<(), Error> {
        Err(unsupported(self.descriptor(), field, "set_scalar"))
    }

    /// Append a decoded element to a repeated scalar field.
    fn push_scalar(&mut self, field: &FieldDescriptor, _value: Scalar<'_>) -> Result<(), Error> {
        Err(unsupported(self.descriptor(), field, "push_scalar"))
    }

    /// Replace a singular message field with an empty message and return it to decode into.  A
    /// later occurrence of the field replaces an earlier one.
    fn replace_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        Err(unsupported(self.descriptor(), field, "replace_message"))
    }

    /// Append an empty message to a repeated message field and return it to decode into.
    fn push_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        Err(unsupported(self.descriptor(), field, "push_message"))
    }

    /// Store a decoded map entry.  A later entry for the same key replaces an earlier one.
    fn insert_scalar(
        &mut self,
        field: &FieldDescriptor,
        _key: &str,
        _value: Scalar<'_>,
    ) -> Result<(), Error> {
        Err(unsupported(self.descriptor(), field, "insert_scalar"))
    }

    /// Replace the entry for `key` with an empty message and return it to decode into.
    fn insert_message(
        &mut self,
        field: &FieldDescriptor,
        _key: &str,
    ) -> Result<&mut dyn Record, Error> {
        Err(unsupported(self.descriptor(), field, "insert_message"))
    }
}

fn unsupported(record: &RecordDescriptor, field: &FieldDescriptor, what: &'static str) -> Error {
    Error::Unsupported {
        record: record.name(),
        field: field.name(),
        what,
    }
}
