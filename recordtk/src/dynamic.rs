//! A record whose shape comes entirely from its descriptor.

use std::collections::BTreeMap;

use super::{
    Error, FieldDescriptor, FieldKind, ListValue, Presence, Record, RecordDescriptor, Scalar,
    ScalarList, Value,
};

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Scalar(Option<Value>),
    List(ListValue),
    ScalarMap(BTreeMap<String, Value>),
    Message(Option<Box<DynamicRecord>>),
    Messages(Vec<DynamicRecord>),
    MessageMap(BTreeMap<String, DynamicRecord>),
}

impl Slot {
    fn new(field: &FieldDescriptor) -> Self {
        match field.kind() {
            FieldKind::Scalar(ty, Presence::Implicit) => Slot::Scalar(Some(Value::default_for(ty))),
            FieldKind::Scalar(_, Presence::Explicit) => Slot::Scalar(None),
            FieldKind::ScalarList(ty) => Slot::List(ListValue::new(ty)),
            FieldKind::ScalarMap(_) => Slot::ScalarMap(BTreeMap::new()),
            FieldKind::Message(_) => Slot::Message(None),
            FieldKind::MessageList(_) => Slot::Messages(Vec::new()),
            FieldKind::MessageMap(_) => Slot::MessageMap(BTreeMap::new()),
        }
    }
}

////////////////////////////////////////// DynamicRecord ///////////////////////////////////////////

/// A record that stores one slot per field of its descriptor and can hold any schema.
///
/// Implicit-presence scalars always hold a value and start at the default; clearing one resets it
/// to the default.  Explicit-presence scalars and singular messages start unset.  Map entries are
/// kept, and therefore encoded, in key order.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicRecord {
    descriptor: &'static RecordDescriptor,
    slots: Vec<Slot>,
}

impl DynamicRecord {
    pub fn new(descriptor: &'static RecordDescriptor) -> Self {
        let slots = descriptor.fields().iter().map(Slot::new).collect();
        Self { descriptor, slots }
    }

    fn lookup(&self, name: &str) -> Result<(&'static FieldDescriptor, usize), Error> {
        let field = self
            .descriptor
            .field_by_name(name)
            .ok_or_else(|| Error::NoSuchField {
                record: self.descriptor.name(),
                field: name.to_owned(),
            })?;
        let idx = self.index_of(field)?;
        Ok((field, idx))
    }

    fn index_of(&self, field: &FieldDescriptor) -> Result<usize, Error> {
        self.descriptor
            .position(field.number())
            .ok_or_else(|| Error::NoSuchField {
                record: self.descriptor.name(),
                field: field.name().to_owned(),
            })
    }

    fn slot(&self, field: &FieldDescriptor) -> Option<&Slot> {
        self.index_of(field).ok().map(|idx| &self.slots[idx])
    }

    fn slot_mut(&mut self, field: &FieldDescriptor) -> Result<&mut Slot, Error> {
        let idx = self.index_of(field)?;
        Ok(&mut self.slots[idx])
    }

    fn named(&self, name: &str) -> Option<&Slot> {
        self.lookup(name).ok().map(|(_, idx)| &self.slots[idx])
    }

    /// Set a singular scalar field.  Unsigned integers convert to the field's fixed-width type
    /// where needed.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let (field, _) = self.lookup(name)?;
        let value = coerce(field, value.into());
        self.set_scalar(field, value.as_scalar())
    }

    /// The value of a singular scalar field, if it is set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.named(name)? {
            Slot::Scalar(value) => value.as_ref(),
            _ => None,
        }
    }

    /// Reset a field to its initial state.
    pub fn clear(&mut self, name: &str) -> Result<(), Error> {
        let (field, idx) = self.lookup(name)?;
        self.slots[idx] = Slot::new(field);
        Ok(())
    }

    /// Append to a repeated scalar field.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let (field, _) = self.lookup(name)?;
        let value = coerce(field, value.into());
        self.push_scalar(field, value.as_scalar())
    }

    /// The elements of a repeated scalar field.
    pub fn list(&self, name: &str) -> Option<ScalarList<'_>> {
        match self.named(name)? {
            Slot::List(list) => Some(list.as_list()),
            _ => None,
        }
    }

    /// Insert or replace one entry of a scalar map.
    pub fn insert(
        &mut self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), Error> {
        let (field, _) = self.lookup(name)?;
        let key: String = key.into();
        let value = coerce(field, value.into());
        self.insert_scalar(field, &key, value.as_scalar())
    }

    /// The entries of a scalar map, in key order.
    pub fn entries(&self, name: &str) -> Option<&BTreeMap<String, Value>> {
        match self.named(name)? {
            Slot::ScalarMap(map) => Some(map),
            _ => None,
        }
    }

    /// Set a singular message field.
    pub fn set_message(&mut self, name: &str, child: DynamicRecord) -> Result<(), Error> {
        let (field, idx) = self.lookup(name)?;
        check_child(field, &child)?;
        match &mut self.slots[idx] {
            Slot::Message(slot) => {
                *slot = Some(Box::new(child));
                Ok(())
            }
            _ => Err(wrong_kind(self.descriptor, field, "set_message")),
        }
    }

    /// The value of a singular message field, if it is set.
    pub fn message_value(&self, name: &str) -> Option<&DynamicRecord> {
        match self.named(name)? {
            Slot::Message(child) => child.as_deref(),
            _ => None,
        }
    }

    /// Append to a repeated message field.
    pub fn append_message(&mut self, name: &str, child: DynamicRecord) -> Result<(), Error> {
        let (field, idx) = self.lookup(name)?;
        check_child(field, &child)?;
        match &mut self.slots[idx] {
            Slot::Messages(list) => {
                list.push(child);
                Ok(())
            }
            _ => Err(wrong_kind(self.descriptor, field, "append_message")),
        }
    }

    /// The elements of a repeated message field.  Empty for fields of any other kind.
    pub fn messages(&self, name: &str) -> &[DynamicRecord] {
        match self.named(name) {
            Some(Slot::Messages(list)) => list,
            _ => &[],
        }
    }

    /// Insert or replace one entry of a message map.
    pub fn insert_entry(
        &mut self,
        name: &str,
        key: impl Into<String>,
        child: DynamicRecord,
    ) -> Result<(), Error> {
        let (field, idx) = self.lookup(name)?;
        check_child(field, &child)?;
        match &mut self.slots[idx] {
            Slot::MessageMap(map) => {
                map.insert(key.into(), child);
                Ok(())
            }
            _ => Err(wrong_kind(self.descriptor, field, "insert_entry")),
        }
    }

    /// The entries of a message map, in key order.
    pub fn message_entries(&self, name: &str) -> Option<&BTreeMap<String, DynamicRecord>> {
        match self.named(name)? {
            Slot::MessageMap(map) => Some(map),
            _ => None,
        }
    }
}

fn coerce(field: &FieldDescriptor, value: Value) -> Value {
    match field.scalar_type() {
        Some(ty) => value.coerce(ty),
        None => value,
    }
}

fn check_child(field: &FieldDescriptor, child: &DynamicRecord) -> Result<(), Error> {
    match field.kind().record() {
        Some(expected) if expected == child.descriptor => Ok(()),
        Some(expected) => Err(Error::DescriptorMismatch {
            field: field.name(),
            expected: expected.name(),
            got: child.descriptor.name(),
        }),
        None => Ok(()),
    }
}

fn check_scalar(field: &FieldDescriptor, value: &Scalar<'_>) -> Result<(), Error> {
    match field.scalar_type() {
        Some(expected) if expected != value.scalar_type() => Err(Error::TypeMismatch {
            field: field.name(),
            expected,
            got: value.scalar_type(),
        }),
        _ => Ok(()),
    }
}

fn wrong_kind(record: &RecordDescriptor, field: &FieldDescriptor, what: &'static str) -> Error {
    Error::Unsupported {
        record: record.name(),
        field: field.name(),
        what,
    }
}

impl Record for DynamicRecord {
    fn descriptor(&self) -> &'static RecordDescriptor {
        self.descriptor
    }

    fn scalar(&self, field: &FieldDescriptor) -> Option<Scalar<'_>> {
        match self.slot(field)? {
            Slot::Scalar(value) => value.as_ref().map(Value::as_scalar),
            _ => None,
        }
    }

    fn scalar_list(&self, field: &FieldDescriptor) -> Option<ScalarList<'_>> {
        match self.slot(field)? {
            Slot::List(list) => Some(list.as_list()),
            _ => None,
        }
    }

    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Record> {
        match self.slot(field)? {
            Slot::Message(Some(child)) => Some(&**child),
            _ => None,
        }
    }

    fn visit_messages(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if let Some(Slot::Messages(list)) = self.slot(field) {
            for child in list {
                visit(child)?;
            }
        }
        Ok(())
    }

    fn visit_scalar_entries(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&str, Scalar<'_>) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if let Some(Slot::ScalarMap(map)) = self.slot(field) {
            for (key, value) in map {
                visit(key, value.as_scalar())?;
            }
        }
        Ok(())
    }

    fn visit_message_entries(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&str, &dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if let Some(Slot::MessageMap(map)) = self.slot(field) {
            for (key, child) in map {
                visit(key, child)?;
            }
        }
        Ok(())
    }

    fn set_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        check_scalar(field, &value)?;
        let descriptor = self.descriptor;
        match self.slot_mut(field)? {
            Slot::Scalar(slot) => {
                *slot = Some(value.to_value());
                Ok(())
            }
            _ => Err(wrong_kind(descriptor, field, "set_scalar")),
        }
    }

    fn push_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        let descriptor = self.descriptor;
        match self.slot_mut(field)? {
            Slot::List(list) => list.push(field, value),
            _ => Err(wrong_kind(descriptor, field, "push_scalar")),
        }
    }

    fn replace_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        let descriptor = self.descriptor;
        let nested = field.kind().record();
        match (self.slot_mut(field)?, nested) {
            (Slot::Message(slot), Some(nested)) => {
                let child = slot.insert(Box::new(DynamicRecord::new(nested)));
                Ok(&mut **child)
            }
            _ => Err(wrong_kind(descriptor, field, "replace_message")),
        }
    }

    fn push_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        let descriptor = self.descriptor;
        let nested = field.kind().record();
        match (self.slot_mut(field)?, nested) {
            (Slot::Messages(list), Some(nested)) => {
                list.push(DynamicRecord::new(nested));
                match list.last_mut() {
                    Some(child) => Ok(child),
                    None => Err(wrong_kind(descriptor, field, "push_message")),
                }
            }
            _ => Err(wrong_kind(descriptor, field, "push_message")),
        }
    }

    fn insert_scalar(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        value: Scalar<'_>,
    ) -> Result<(), Error> {
        check_scalar(field, &value)?;
        let descriptor = self.descriptor;
        match self.slot_mut(field)? {
            Slot::ScalarMap(map) => {
                map.insert(key.to_owned(), value.to_value());
                Ok(())
            }
            _ => Err(wrong_kind(descriptor, field, "insert_scalar")),
        }
    }

    fn insert_message(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
    ) -> Result<&mut dyn Record, Error> {
        let descriptor = self.descriptor;
        let nested = field.kind().record();
        match (self.slot_mut(field)?, nested) {
            (Slot::MessageMap(map), Some(nested)) => {
                let child = map.entry(key.to_owned()).or_insert_with(|| DynamicRecord::new(nested));
                *child = DynamicRecord::new(nested);
                Ok(child)
            }
            _ => Err(wrong_kind(descriptor, field, "insert_message")),
        }
    }
}

///////////////////////////////////////////// mod tests ////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, ScalarType};

    static POINT_FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor::scalar(1, "x", ScalarType::Int32),
        FieldDescriptor::optional(2, "label", ScalarType::String),
        FieldDescriptor::list(3, "checksums", ScalarType::Fixed32),
    ];
    static POINT: RecordDescriptor = RecordDescriptor::new("Point", &POINT_FIELDS);

    static PATH_FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor::message(1, "start", &POINT),
        FieldDescriptor::messages(2, "points", &POINT),
        FieldDescriptor::message_map(3, "named", &POINT),
    ];
    static PATH: RecordDescriptor = RecordDescriptor::new("Path", &PATH_FIELDS);

    #[test]
    fn implicit_fields_start_at_default() {
        let point = DynamicRecord::new(&POINT);
        assert_eq!(Some(&Value::Int32(0)), point.get("x"));
        assert_eq!(None, point.get("label"));
    }

    #[test]
    fn set_and_clear() {
        let mut point = DynamicRecord::new(&POINT);
        point.set("x", 5i32).unwrap();
        point.set("label", "origin").unwrap();
        assert_eq!(Some(&Value::Int32(5)), point.get("x"));
        assert_eq!(Some(&Value::String("origin".to_owned())), point.get("label"));
        point.clear("x").unwrap();
        point.clear("label").unwrap();
        assert_eq!(Some(&Value::Int32(0)), point.get("x"));
        assert_eq!(None, point.get("label"));
    }

    #[test]
    fn unsigned_coerces_to_fixed() {
        let mut point = DynamicRecord::new(&POINT);
        point.push("checksums", 7u32).unwrap();
        assert_eq!(Some(ScalarList::Fixed32(&[7])), point.list("checksums"));
    }

    #[test]
    fn type_and_name_errors() {
        let mut point = DynamicRecord::new(&POINT);
        assert_eq!(
            Err(Error::TypeMismatch {
                field: "x",
                expected: ScalarType::Int32,
                got: ScalarType::String,
            }),
            point.set("x", "five")
        );
        assert_eq!(
            Err(Error::NoSuchField {
                record: "Point",
                field: "y".to_owned(),
            }),
            point.set("y", 1i32)
        );
        assert!(point.push("x", 1i32).is_err());
    }

    #[test]
    fn nested_records_are_checked() {
        let mut path = DynamicRecord::new(&PATH);
        path.set_message("start", DynamicRecord::new(&POINT)).unwrap();
        assert!(path.set_message("start", DynamicRecord::new(&PATH)).is_err());
        path.append_message("points", DynamicRecord::new(&POINT)).unwrap();
        path.insert_entry("named", "home", DynamicRecord::new(&POINT))
            .unwrap();
        assert_eq!(1, path.messages("points").len());
        assert!(path.message_value("start").is_some());
        assert_eq!(1, path.message_entries("named").map(|m| m.len()).unwrap_or(0));
    }

    #[test]
    fn insert_message_replaces() {
        let mut path = DynamicRecord::new(&PATH);
        let mut home = DynamicRecord::new(&POINT);
        home.set("x", 9i32).unwrap();
        path.insert_entry("named", "home", home).unwrap();
        let field = PATH.field(3).unwrap();
        path.insert_message(field, "home").unwrap();
        let entries = path.message_entries("named").unwrap();
        assert_eq!(Some(&Value::Int32(0)), entries["home"].get("x"));
    }
}
