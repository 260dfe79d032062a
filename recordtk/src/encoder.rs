//! The second pass:  write a record using the sizes the first pass cached.

use wiretk::{v64, Packable, Tag, WireType};

use super::sizer::{message_entry_size, scalar_entry_size, MAP_KEY, MAP_VALUE};
use super::traversal::{walk, Visitor};
use super::{Error, FieldDescriptor, Record, Scalar, ScalarList, SizeCache};

/// Append `record` to `out`.  `cache` must hold the sizes [crate::sizer::compute_size] computed
/// for this record with `base_index` equal to `index`.  Returns the first slot after this record
/// and its descendants, which matches what the size pass returned.
pub fn encode(
    record: &dyn Record,
    out: &mut Vec<u8>,
    cache: &SizeCache,
    index: usize,
) -> Result<usize, Error> {
    let expected = cache.get(index)?;
    let start = out.len();
    let mut encoder = Encoder {
        cache,
        out,
        index: index + 1,
    };
    walk(record, &mut encoder)?;
    let written = encoder.out.len() - start;
    if written != expected {
        return Err(Error::CacheMismatch { expected, written });
    }
    Ok(encoder.index)
}

struct Encoder<'c, 'o> {
    cache: &'c SizeCache,
    out: &'o mut Vec<u8>,
    index: usize,
}

impl Encoder<'_, '_> {
    fn length(&mut self, len: usize) {
        v64::from(len).pack(self.out);
    }

    fn nested(&mut self, child: &dyn Record) -> Result<(), Error> {
        self.index = encode(child, self.out, self.cache, self.index)?;
        Ok(())
    }
}

impl Visitor for Encoder<'_, '_> {
    fn scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        value.pack_field(field.field_number(), self.out);
        Ok(())
    }

    fn scalar_list(&mut self, field: &FieldDescriptor, list: ScalarList<'_>) -> Result<(), Error> {
        if list.scalar_type().is_packable() {
            field.tag().pack(self.out);
            self.length(list.payload_size());
            for value in list.iter() {
                value.pack_payload(self.out);
            }
        } else {
            for value in list.iter() {
                value.pack_field(field.field_number(), self.out);
            }
        }
        Ok(())
    }

    fn message(&mut self, field: &FieldDescriptor, child: &dyn Record) -> Result<(), Error> {
        field.tag().pack(self.out);
        let size = self.cache.get(self.index)?;
        self.length(size);
        self.nested(child)
    }

    fn scalar_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        value: Scalar<'_>,
    ) -> Result<(), Error> {
        field.tag().pack(self.out);
        self.length(scalar_entry_size(key, value));
        Scalar::String(key).pack_field(MAP_KEY, self.out);
        value.pack_field(MAP_VALUE, self.out);
        Ok(())
    }

    fn message_entry(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        child: &dyn Record,
    ) -> Result<(), Error> {
        let size = self.cache.get(self.index)?;
        field.tag().pack(self.out);
        self.length(message_entry_size(key, size));
        Scalar::String(key).pack_field(MAP_KEY, self.out);
        Tag::new(MAP_VALUE, WireType::LengthDelimited).pack(self.out);
        self.length(size);
        self.nested(child)
    }
}
