//! The first pass:  compute the encoded size of every record in a tree.

use wiretk::{tag_size, varint_size, FieldNumber};

use super::traversal::{walk, Visitor};
use super::{Error, FieldDescriptor, Record, Scalar, ScalarList, SizeCache};

/// Field number of the key inside a map entry.
pub const MAP_KEY: FieldNumber = FieldNumber::must(1);
/// Field number of the value inside a map entry.
pub const MAP_VALUE: FieldNumber = FieldNumber::must(2);

/// Store the encoded size of `record` at `base_index` and the sizes of all its nested records at
/// the slots after it.  Returns the first slot not used by this record or its descendants.
pub fn compute_size(
    record: &dyn Record,
    cache: &mut SizeCache,
    base_index: usize,
) -> Result<usize, Error> {
    cache.reserve(base_index);
    let mut sizer = Sizer {
        cache,
        index: base_index + 1,
        size: 0,
    };
    walk(record, &mut sizer)?;
    let Sizer { cache, index, size } = sizer;
    cache.set(base_index, size);
    Ok(index)
}

struct Sizer<'c> {
    cache: &'c mut SizeCache,
    index: usize,
    size: usize,
}

impl Sizer<'_> {
    fn nested(&mut self, child: &dyn Record) -> Result<usize, Error> {
        let slot = self.index;
        self.index = compute_size(child, self.cache, slot)?;
        self.cache.get(slot)
    }
}

impl Visitor for Sizer<'_> {
    fn scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        self.size += value.field_size(field.field_number());
        Ok(())
    }

    fn scalar_list(&mut self, field: &FieldDescriptor, list: ScalarList<'_>) -> Result<(), Error> {
        self.size += list_size(field, list);
        Ok(())
    }

    fn message(&mut self, field: &FieldDescriptor, child: &dyn Record) -> Result<(), Error> {
        let size = self.nested(child)?;
        self.size += delimited_size(field.tag_size(), size);
        Ok(())
    }

    fn scalar_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        value: Scalar<'_>,
    ) -> Result<(), Error> {
        self.size += delimited_size(field.tag_size(), scalar_entry_size(key, value));
        Ok(())
    }

    fn message_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        child: &dyn Record,
    ) -> Result<(), Error> {
        let size = self.nested(child)?;
        self.size += delimited_size(field.tag_size(), message_entry_size(key, size));
        Ok(())
    }
}

/// A tag, a varint length, and `len` bytes.
pub(crate) fn delimited_size(tag_size: usize, len: usize) -> usize {
    tag_size + varint_size(len as u64) + len
}

/// Bytes a non-empty list takes with its tags.  Packable lists are one block; strings and bytes
/// repeat the tag per element.
pub(crate) fn list_size(field: &FieldDescriptor, list: ScalarList<'_>) -> usize {
    if list.scalar_type().is_packable() {
        delimited_size(field.tag_size(), list.payload_size())
    } else {
        list.len() * field.tag_size() + list.payload_size()
    }
}

/// Bytes inside one scalar map entry.  The value is written even when it is the default.
pub(crate) fn scalar_entry_size(key: &str, value: Scalar<'_>) -> usize {
    Scalar::String(key).field_size(MAP_KEY) + value.field_size(MAP_VALUE)
}

/// Bytes inside one message map entry whose value encodes to `child_size` bytes.
pub(crate) fn message_entry_size(key: &str, child_size: usize) -> usize {
    Scalar::String(key).field_size(MAP_KEY) + delimited_size(tag_size(MAP_VALUE), child_size)
}
