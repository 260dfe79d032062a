use std::collections::BTreeMap;

use recordtk::{
    decode, decode_from_reader, decode_into, decoder, encode, Error, ScalarType, Timestamp,
};
use wiretk::{Input, WireType};

mod common;

use common::{Address, RecursiveItem, User};

fn full_user() -> User {
    let mut user = User {
        address: Some(Address {
            street: Some("1 Infinite Loop".to_owned()),
            number: 1,
            tags: vec!["work".to_owned(), String::new()],
        }),
        age: Some(-7),
        bool_field: Some(true),
        score: 99,
        double_field: Some(6.25),
        integer_list_field: vec![0, -1, i32::MAX, i32::MIN],
        long_field: Some(i64::MIN),
        rank: u32::MAX,
        user_name: Some("ünïcödé".to_owned()),
        char_field: u16::MAX,
        short_field: -2,
        byte_field: i8::MIN,
        created: Some(Timestamp::new(1_700_000_000, 5)),
        timeline: vec![Timestamp::EPOCH, Timestamp::new(-1, 999_999_999)],
        ..Default::default()
    };
    user.integer_value_map.insert("zero".to_owned(), 0);
    user.integer_value_map.insert("neg".to_owned(), -12);
    user.string_value_map.insert(String::new(), String::new());
    user.string_value_map
        .insert("k".to_owned(), "v".to_owned());
    user.struct_list_field.push(Address::default());
    user.struct_list_field.push(Address::numbered(2));
    user.struct_value_map
        .insert("home".to_owned(), Address::numbered(3));
    user.struct_value_map.insert(String::new(), Address::default());
    user.deadlines.insert("due".to_owned(), Timestamp::new(3, 0));
    user.deadlines.insert(String::new(), Timestamp::EPOCH);
    user
}

#[test]
fn round_trip_user() {
    let user = full_user();
    let buf = encode(&user).unwrap();
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(user, decoded);
}

#[test]
fn round_trip_recursive() {
    let item = RecursiveItem::leaf("root")
        .with_a(RecursiveItem::leaf("a").with_c(RecursiveItem::leaf("ac")))
        .with_b(RecursiveItem::default())
        .with_c(
            RecursiveItem::leaf("c")
                .with_a(RecursiveItem::leaf("ca").with_b(RecursiveItem::leaf("cab"))),
        );
    let buf = encode(&item).unwrap();
    let decoded: RecursiveItem = decode(&buf).unwrap();
    assert_eq!(item, decoded);
}

#[test]
fn empty_input_is_empty_record() {
    let decoded: User = decode(&[]).unwrap();
    assert_eq!(User::default(), decoded);
}

#[test]
fn unknown_fields_are_skipped() {
    let user = full_user();
    let mut buf = Vec::new();
    // field 20 varint, 21 fixed64, 22 length-delimited, 23 fixed32
    buf.extend_from_slice(&[160, 1, 0x96, 0x01]);
    buf.extend_from_slice(&[169, 1, 1, 2, 3, 4, 5, 6, 7, 8]);
    buf.extend_from_slice(&[178, 1, 3, b'x', b'y', b'z']);
    buf.extend_from_slice(&encode(&user).unwrap());
    buf.extend_from_slice(&[189, 1, 9, 9, 9, 9]);
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(user, decoded);
}

#[test]
fn reserved_field_numbers_are_skipped() {
    // field 19000 = 1, then age = 42
    let buf = [192, 163, 9, 1, 16, 42];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(42), decoded.age);
    assert_eq!(
        User {
            age: Some(42),
            ..Default::default()
        },
        decoded
    );
}

#[test]
fn unknown_fields_inside_nested_message() {
    // address { 7: 5, number: 4 }
    let buf = [10, 4, 56, 5, 16, 4];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(Address::numbered(4)), decoded.address);
}

#[test]
fn unpacked_list_is_accepted() {
    let buf = [48, 1, 48, 2, 50, 2, 3, 4];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(vec![1, 2, 3, 4], decoded.integer_list_field);
}

#[test]
fn later_scalar_wins() {
    let buf = [16, 1, 16, 2];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(2), decoded.age);
}

#[test]
fn repeated_message_field_replaces() {
    // address { number: 1 } address { street: "s" }
    let buf = [10, 2, 16, 1, 10, 3, 10, 1, b's'];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(
        Some(Address {
            street: Some("s".to_owned()),
            number: 0,
            tags: vec![],
        }),
        decoded.address
    );
}

#[test]
fn decode_into_replaces_existing_message() {
    let mut user = User {
        address: Some(Address {
            street: Some("old".to_owned()),
            number: 9,
            tags: vec!["t".to_owned()],
        }),
        ..Default::default()
    };
    // address { number: 2 }
    decode_into(&[10, 2, 16, 2], &mut user).unwrap();
    assert_eq!(Some(Address::numbered(2)), user.address);
}

#[test]
fn repeated_dynamic_message_replaces() {
    use recordtk::{DynamicRecord, Value};
    let mut record = DynamicRecord::new(&common::USER);
    // address { street: "a", number: 1 } address { number: 2 }
    decode_into(&[10, 5, 10, 1, b'a', 16, 1, 10, 2, 16, 2], &mut record).unwrap();
    let address = record.message_value("address").unwrap();
    assert_eq!(None, address.get("street"));
    assert_eq!(Some(&Value::Int32(2)), address.get("number"));
}

#[test]
fn decode_into_merges_with_existing() {
    let mut user = User {
        integer_list_field: vec![9],
        ..Default::default()
    };
    decode_into(&[50, 2, 1, 2], &mut user).unwrap();
    assert_eq!(vec![9, 1, 2], user.integer_list_field);
}

#[test]
fn map_entry_value_before_key() {
    // string_value_map { value: "b", key: "a" }
    let buf = [82, 6, 18, 1, b'b', 10, 1, b'a'];
    let decoded: User = decode(&buf).unwrap();
    let expected: BTreeMap<String, String> = [("a".to_owned(), "b".to_owned())].into();
    assert_eq!(expected, decoded.string_value_map);
}

#[test]
fn message_map_entry_value_before_key() {
    // struct_value_map { value: { number: 5 }, key: "x" }
    let buf = [98, 7, 18, 2, 16, 5, 10, 1, b'x'];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(&Address::numbered(5)), decoded.struct_value_map.get("x"));
}

#[test]
fn map_entry_missing_parts_default() {
    // integer_value_map { key: "k" } integer_value_map { value: 3 }
    let buf = [58, 3, 10, 1, b'k', 58, 2, 16, 3];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(&0), decoded.integer_value_map.get("k"));
    assert_eq!(Some(&3), decoded.integer_value_map.get(""));
    // struct_value_map { key: "e" }
    let buf = [98, 3, 10, 1, b'e'];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(&Address::default()), decoded.struct_value_map.get("e"));
}

#[test]
fn map_entry_unknown_subfield_is_skipped() {
    // integer_value_map { key: "k", 3: 77, value: 4 }
    let buf = [58, 7, 10, 1, b'k', 24, 77, 16, 4];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(&4), decoded.integer_value_map.get("k"));
}

#[test]
fn later_map_entry_wins() {
    let mut first = User::default();
    first
        .struct_value_map
        .insert("k".to_owned(), Address::numbered(1));
    let mut second = User::default();
    second.struct_value_map.insert(
        "k".to_owned(),
        Address {
            street: Some("s".to_owned()),
            ..Default::default()
        },
    );
    let mut buf = encode(&first).unwrap();
    buf.extend_from_slice(&encode(&second).unwrap());
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(second, decoded);
}

#[test]
fn truncated_inputs() {
    let buf = encode(&full_user()).unwrap();
    for len in 1..buf.len() {
        // Cutting between two top-level fields leaves a valid, shorter record.
        if let Err(err) = decode::<User>(&buf[..len]) {
            assert!(
                matches!(
                    err,
                    Error::TruncatedInput { .. } | Error::MalformedVarint { .. }
                ),
                "unexpected error at {}: {:?}",
                len,
                err
            );
        }
    }
    assert!(matches!(
        decode::<User>(&buf[..buf.len() - 1]),
        Err(Error::TruncatedInput { .. })
    ));
}

#[test]
fn nested_length_past_end() {
    let buf = [10, 5, 16, 1];
    assert_eq!(
        Err(Error::TruncatedInput { required: 5, had: 2 }),
        decode::<User>(&buf)
    );
}

#[test]
fn read_cannot_cross_nested_limit() {
    // address of length 2 whose varint wants a third byte
    let buf = [10, 2, 16, 150, 1];
    assert_eq!(
        Err(Error::TruncatedInput { required: 2, had: 1 }),
        decode::<User>(&buf)
    );
}

#[test]
fn wrong_wire_type() {
    let buf = [18, 0];
    assert_eq!(
        Err(Error::WrongWireType {
            record: "User",
            field: "age",
            expected: WireType::Varint,
            got: WireType::LengthDelimited,
        }),
        decode::<User>(&buf)
    );
    // a zero tag inside a nested message
    let buf = [10, 1, 0];
    assert!(decode::<User>(&buf).is_err());
}

#[test]
fn zero_tag_is_an_error() {
    assert!(matches!(
        decode::<User>(&[0, 0]),
        Err(Error::InvalidFieldNumber { field_number: 0, .. })
    ));
}

#[test]
fn group_wire_types_are_errors() {
    assert_eq!(
        Err(Error::UnhandledWireType { wire_type: 3 }),
        decode::<User>(&[163, 1])
    );
    assert_eq!(
        Err(Error::UnhandledWireType { wire_type: 4 }),
        decode::<User>(&[164, 1])
    );
}

#[test]
fn invalid_utf8() {
    let buf = [106, 2, 0xc3, 0x28];
    assert_eq!(Err(Error::StringEncoding), decode::<User>(&buf));
}

#[test]
fn oversized_varint() {
    let mut buf = vec![16];
    buf.extend_from_slice(&[0xff; 11]);
    assert_eq!(
        Err(Error::MalformedVarint { bytes: 10 }),
        decode::<User>(&buf)
    );
}

#[test]
fn int32_keeps_low_bits() {
    // age = 2^32 + 5 on the wire
    let buf = [16, 133, 128, 128, 128, 16];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(5), decoded.age);
}

#[test]
fn narrow_integers_keep_low_bits() {
    let mut buf = vec![112];
    buf.extend_from_slice(&[255, 255, 255, 255, 255, 255, 255, 255, 255, 1]);
    buf.extend_from_slice(&[120, 240, 162, 4]);
    buf.extend_from_slice(&[128, 1, 172, 2]);
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(65535, decoded.char_field);
    assert_eq!(4464, decoded.short_field);
    assert_eq!(44, decoded.byte_field);
}

#[test]
fn timestamp_fields() {
    // created { seconds: 1700000000 }, timeline {}, timeline { nanos: 5 }
    let buf = [
        138, 1, 6, 8, 128, 226, 207, 170, 6, 146, 1, 0, 146, 1, 2, 16, 5,
    ];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(Some(Timestamp::new(1_700_000_000, 0)), decoded.created);
    assert_eq!(
        vec![Timestamp::EPOCH, Timestamp::new(0, 5)],
        decoded.timeline
    );
    // deadlines { key: "d" } takes the epoch
    let decoded: User = decode(&[154, 1, 3, 10, 1, b'd']).unwrap();
    assert_eq!(Some(&Timestamp::EPOCH), decoded.deadlines.get("d"));
}

#[test]
fn timestamp_with_wrong_wire_type() {
    assert_eq!(
        Err(Error::WrongWireType {
            record: "User",
            field: "created",
            expected: WireType::LengthDelimited,
            got: WireType::Varint,
        }),
        decode::<User>(&[136, 1, 1])
    );
    // created { seconds as fixed32 }
    assert_eq!(
        Err(Error::WrongWireType {
            record: "Timestamp",
            field: "seconds",
            expected: WireType::Varint,
            got: WireType::ThirtyTwo,
        }),
        decode::<User>(&[138, 1, 5, 13, 1, 0, 0, 0])
    );
}

fn chain(depth: usize) -> RecursiveItem {
    let mut item = RecursiveItem::leaf("leaf");
    for _ in 0..depth {
        item = RecursiveItem::default().with_a(item);
    }
    item
}

#[test]
fn nesting_up_to_the_limit_decodes() {
    let item = chain(decoder::DEFAULT_RECURSION_LIMIT);
    let decoded: RecursiveItem = decode(&encode(&item).unwrap()).unwrap();
    assert_eq!(item, decoded);
}

#[test]
fn nesting_past_the_limit_is_an_error() {
    let buf = encode(&chain(decoder::DEFAULT_RECURSION_LIMIT + 1)).unwrap();
    assert_eq!(
        Err(Error::RecursionLimit {
            limit: decoder::DEFAULT_RECURSION_LIMIT
        }),
        decode::<RecursiveItem>(&buf)
    );
}

#[test]
fn custom_recursion_limit() {
    let buf = encode(&chain(3)).unwrap();
    let mut item = RecursiveItem::default();
    assert_eq!(
        Err(Error::RecursionLimit { limit: 2 }),
        decoder::decode_with_limit(&mut Input::new(&buf), &mut item, 2)
    );
    let mut item = RecursiveItem::default();
    decoder::decode_with_limit(&mut Input::new(&buf), &mut item, 3).unwrap();
    assert_eq!(chain(3), item);
    // a message map entry counts as a level
    let mut user = User::default();
    user.struct_value_map.insert("k".to_owned(), Address::default());
    let buf = encode(&user).unwrap();
    assert_eq!(
        Err(Error::RecursionLimit { limit: 0 }),
        decoder::decode_with_limit(&mut Input::new(&buf), &mut User::default(), 0)
    );
}

#[test]
fn from_reader() {
    let user = full_user();
    let buf = encode(&user).unwrap();
    let mut decoded = User::default();
    decode_from_reader(&mut buf.as_slice(), &mut decoded).unwrap();
    assert_eq!(user, decoded);
    let mut bad: &[u8] = &[18, 0];
    let err = decode_from_reader(&mut bad, &mut User::default()).unwrap_err();
    assert_eq!(std::io::ErrorKind::InvalidData, err.kind());
}

#[test]
fn uint32_field() {
    let buf = [72, 5];
    let decoded: User = decode(&buf).unwrap();
    assert_eq!(5, decoded.rank);
    assert_eq!(ScalarType::UInt32, common::USER.field(9).unwrap().scalar_type().unwrap());
}
