#![allow(dead_code)]

use std::collections::BTreeMap;

use recordtk::{
    Error, FieldDescriptor, Record, RecordDescriptor, Scalar, ScalarList, ScalarType, Timestamp,
};

fn unsupported(record: &'static str, field: &FieldDescriptor, what: &'static str) -> Error {
    Error::Unsupported {
        record,
        field: field.name(),
        what,
    }
}

////////////////////////////////////////////// Address /////////////////////////////////////////////

static ADDRESS_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::optional(1, "street", ScalarType::String),
    FieldDescriptor::scalar(2, "number", ScalarType::Int32),
    FieldDescriptor::list(3, "tags", ScalarType::String),
];
pub static ADDRESS: RecordDescriptor = RecordDescriptor::new("Address", &ADDRESS_FIELDS);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub number: i32,
    pub tags: Vec<String>,
}

impl Address {
    pub fn numbered(number: i32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }
}

impl Record for Address {
    fn descriptor(&self) -> &'static RecordDescriptor {
        &ADDRESS
    }

    fn scalar(&self, field: &FieldDescriptor) -> Option<Scalar<'_>> {
        match field.number() {
            1 => self.street.as_deref().map(Scalar::String),
            2 => Some(Scalar::Int32(self.number)),
            _ => None,
        }
    }

    fn scalar_list(&self, field: &FieldDescriptor) -> Option<ScalarList<'_>> {
        match field.number() {
            3 => Some(ScalarList::String(&self.tags)),
            _ => None,
        }
    }

    fn set_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match field.number() {
            1 => self.street = Some(value.extract(field)?),
            2 => self.number = value.extract(field)?,
            _ => return Err(unsupported("Address", field, "set_scalar")),
        }
        Ok(())
    }

    fn push_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match field.number() {
            3 => self.tags.push(value.extract(field)?),
            _ => return Err(unsupported("Address", field, "push_scalar")),
        }
        Ok(())
    }
}

/////////////////////////////////////////////// User ///////////////////////////////////////////////

static USER_FIELDS: [FieldDescriptor; 19] = [
    FieldDescriptor::message(1, "address", &ADDRESS),
    FieldDescriptor::optional(2, "age", ScalarType::Int32),
    FieldDescriptor::optional(3, "bool_field", ScalarType::Bool),
    FieldDescriptor::scalar(4, "score", ScalarType::Int32),
    FieldDescriptor::optional(5, "double_field", ScalarType::Double),
    FieldDescriptor::list(6, "integer_list_field", ScalarType::Int32),
    FieldDescriptor::map(7, "integer_value_map", ScalarType::Int32),
    FieldDescriptor::optional(8, "long_field", ScalarType::Int64),
    FieldDescriptor::scalar(9, "rank", ScalarType::UInt32),
    FieldDescriptor::map(10, "string_value_map", ScalarType::String),
    FieldDescriptor::messages(11, "struct_list_field", &ADDRESS),
    FieldDescriptor::message_map(12, "struct_value_map", &ADDRESS),
    FieldDescriptor::optional(13, "user_name", ScalarType::String),
    FieldDescriptor::scalar(14, "char_field", ScalarType::Int32),
    FieldDescriptor::scalar(15, "short_field", ScalarType::Int32),
    FieldDescriptor::scalar(16, "byte_field", ScalarType::Int32),
    FieldDescriptor::optional(17, "created", ScalarType::Timestamp),
    FieldDescriptor::list(18, "timeline", ScalarType::Timestamp),
    FieldDescriptor::map(19, "deadlines", ScalarType::Timestamp),
];
pub static USER: RecordDescriptor = RecordDescriptor::new("User", &USER_FIELDS);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub address: Option<Address>,
    pub age: Option<i32>,
    pub bool_field: Option<bool>,
    pub score: i32,
    pub double_field: Option<f64>,
    pub integer_list_field: Vec<i32>,
    pub integer_value_map: BTreeMap<String, i32>,
    pub long_field: Option<i64>,
    pub rank: u32,
    pub string_value_map: BTreeMap<String, String>,
    pub struct_list_field: Vec<Address>,
    pub struct_value_map: BTreeMap<String, Address>,
    pub user_name: Option<String>,
    pub char_field: u16,
    pub short_field: i16,
    pub byte_field: i8,
    pub created: Option<Timestamp>,
    pub timeline: Vec<Timestamp>,
    pub deadlines: BTreeMap<String, Timestamp>,
}

impl Record for User {
    fn descriptor(&self) -> &'static RecordDescriptor {
        &USER
    }

    fn scalar(&self, field: &FieldDescriptor) -> Option<Scalar<'_>> {
        match field.number() {
            2 => self.age.map(Scalar::Int32),
            3 => self.bool_field.map(Scalar::Bool),
            4 => Some(Scalar::Int32(self.score)),
            5 => self.double_field.map(Scalar::Double),
            8 => self.long_field.map(Scalar::Int64),
            9 => Some(Scalar::UInt32(self.rank)),
            13 => self.user_name.as_deref().map(Scalar::String),
            14 => Some(Scalar::Int32(self.char_field as i32)),
            15 => Some(Scalar::Int32(self.short_field as i32)),
            16 => Some(Scalar::Int32(self.byte_field as i32)),
            17 => self.created.map(Scalar::Timestamp),
            _ => None,
        }
    }

    fn scalar_list(&self, field: &FieldDescriptor) -> Option<ScalarList<'_>> {
        match field.number() {
            6 => Some(ScalarList::Int32(&self.integer_list_field)),
            18 => Some(ScalarList::Timestamp(&self.timeline)),
            _ => None,
        }
    }

    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Record> {
        match field.number() {
            1 => self.address.as_ref().map(|a| a as &dyn Record),
            _ => None,
        }
    }

    fn visit_messages(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if field.number() == 11 {
            for address in self.struct_list_field.iter() {
                visit(address)?;
            }
        }
        Ok(())
    }

    fn visit_scalar_entries(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&str, Scalar<'_>) -> Result<(), Error>,
    ) -> Result<(), Error> {
        match field.number() {
            7 => {
                for (key, value) in self.integer_value_map.iter() {
                    visit(key, Scalar::Int32(*value))?;
                }
            }
            10 => {
                for (key, value) in self.string_value_map.iter() {
                    visit(key, Scalar::String(value))?;
                }
            }
            19 => {
                for (key, value) in self.deadlines.iter() {
                    visit(key, Scalar::Timestamp(*value))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_message_entries(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&str, &dyn Record) -> Result<(), Error>,
    ) -> Result<(), Error> {
        if field.number() == 12 {
            for (key, address) in self.struct_value_map.iter() {
                visit(key, address)?;
            }
        }
        Ok(())
    }

    fn set_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match field.number() {
            2 => self.age = Some(value.extract(field)?),
            3 => self.bool_field = Some(value.extract(field)?),
            4 => self.score = value.extract(field)?,
            5 => self.double_field = Some(value.extract(field)?),
            8 => self.long_field = Some(value.extract(field)?),
            9 => self.rank = value.extract(field)?,
            13 => self.user_name = Some(value.extract(field)?),
            14 => self.char_field = value.extract(field)?,
            15 => self.short_field = value.extract(field)?,
            16 => self.byte_field = value.extract(field)?,
            17 => self.created = Some(value.extract(field)?),
            _ => return Err(unsupported("User", field, "set_scalar")),
        }
        Ok(())
    }

    fn push_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match field.number() {
            6 => self.integer_list_field.push(value.extract(field)?),
            18 => self.timeline.push(value.extract(field)?),
            _ => return Err(unsupported("User", field, "push_scalar")),
        }
        Ok(())
    }

    fn replace_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        match field.number() {
            1 => Ok(self.address.insert(Address::default())),
            _ => Err(unsupported("User", field, "replace_message")),
        }
    }

    fn push_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        match field.number() {
            11 => {
                let idx = self.struct_list_field.len();
                self.struct_list_field.push(Address::default());
                Ok(&mut self.struct_list_field[idx])
            }
            _ => Err(unsupported("User", field, "push_message")),
        }
    }

    fn insert_scalar(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
        value: Scalar<'_>,
    ) -> Result<(), Error> {
        match field.number() {
            7 => {
                self.integer_value_map
                    .insert(key.to_owned(), value.extract(field)?);
            }
            10 => {
                self.string_value_map
                    .insert(key.to_owned(), value.extract(field)?);
            }
            19 => {
                self.deadlines.insert(key.to_owned(), value.extract(field)?);
            }
            _ => return Err(unsupported("User", field, "insert_scalar")),
        }
        Ok(())
    }

    fn insert_message(
        &mut self,
        field: &FieldDescriptor,
        key: &str,
    ) -> Result<&mut dyn Record, Error> {
        match field.number() {
            12 => {
                let slot = self.struct_value_map.entry(key.to_owned()).or_default();
                *slot = Address::default();
                Ok(slot)
            }
            _ => Err(unsupported("User", field, "insert_message")),
        }
    }
}

/////////////////////////////////////////// RecursiveItem //////////////////////////////////////////

static RECURSIVE_ITEM_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::scalar(1, "id", ScalarType::String),
    FieldDescriptor::message(2, "child_a", &RECURSIVE_ITEM),
    FieldDescriptor::message(3, "child_b", &RECURSIVE_ITEM),
    FieldDescriptor::message(4, "child_c", &RECURSIVE_ITEM),
];
pub static RECURSIVE_ITEM: RecordDescriptor =
    RecordDescriptor::new("RecursiveItem", &RECURSIVE_ITEM_FIELDS);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecursiveItem {
    pub id: String,
    pub child_a: Option<Box<RecursiveItem>>,
    pub child_b: Option<Box<RecursiveItem>>,
    pub child_c: Option<Box<RecursiveItem>>,
}

impl RecursiveItem {
    pub fn leaf(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_a(mut self, child: RecursiveItem) -> Self {
        self.child_a = Some(Box::new(child));
        self
    }

    pub fn with_b(mut self, child: RecursiveItem) -> Self {
        self.child_b = Some(Box::new(child));
        self
    }

    pub fn with_c(mut self, child: RecursiveItem) -> Self {
        self.child_c = Some(Box::new(child));
        self
    }

    fn child(&self, number: u32) -> Option<&RecursiveItem> {
        match number {
            2 => self.child_a.as_deref(),
            3 => self.child_b.as_deref(),
            4 => self.child_c.as_deref(),
            _ => None,
        }
    }

    fn child_mut(&mut self, number: u32) -> Option<&mut Option<Box<RecursiveItem>>> {
        match number {
            2 => Some(&mut self.child_a),
            3 => Some(&mut self.child_b),
            4 => Some(&mut self.child_c),
            _ => None,
        }
    }
}

impl Record for RecursiveItem {
    fn descriptor(&self) -> &'static RecordDescriptor {
        &RECURSIVE_ITEM
    }

    fn scalar(&self, field: &FieldDescriptor) -> Option<Scalar<'_>> {
        match field.number() {
            1 => Some(Scalar::String(&self.id)),
            _ => None,
        }
    }

    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Record> {
        self.child(field.number()).map(|c| c as &dyn Record)
    }

    fn set_scalar(&mut self, field: &FieldDescriptor, value: Scalar<'_>) -> Result<(), Error> {
        match field.number() {
            1 => self.id = value.extract(field)?,
            _ => return Err(unsupported("RecursiveItem", field, "set_scalar")),
        }
        Ok(())
    }

    fn replace_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn Record, Error> {
        match self.child_mut(field.number()) {
            Some(slot) => Ok(&mut **slot.insert(Box::default())),
            None => Err(unsupported("RecursiveItem", field, "replace_message")),
        }
    }
}
