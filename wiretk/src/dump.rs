//! Render an encoded message without knowing its schema, in the manner of `protoc
//! --decode_raw`.  Length-delimited values are shown as nested messages when they parse as one,
//! as strings when they are UTF-8, and as hex otherwise.

use std::fmt::Write;

use super::{Error, Input, WireType};

/// Render `buf` one field per line.  `max_depth` bounds how far nested messages are expanded.
pub fn render(buf: &[u8], max_depth: usize) -> Result<String, Error> {
    let mut out = String::new();
    render_into(buf, 0, max_depth, &mut out)?;
    Ok(out)
}

fn render_into(buf: &[u8], depth: usize, max_depth: usize, out: &mut String) -> Result<(), Error> {
    let mut input = Input::new(buf);
    let indent = "  ".repeat(depth);
    while !input.at_limit() {
        let tag = input.read_tag()?;
        let number = tag.field_number;
        // Writing to a String does not fail.
        let _ = match tag.wire_type {
            WireType::Varint => writeln!(out, "{}{}: {}", indent, number, input.read_varint64()?),
            WireType::SixtyFour => {
                writeln!(out, "{}{}: 0x{:016x}", indent, number, input.read_fixed64()?)
            }
            WireType::ThirtyTwo => {
                writeln!(out, "{}{}: 0x{:08x}", indent, number, input.read_fixed32()?)
            }
            WireType::LengthDelimited => {
                let payload = input.read_length_delimited()?;
                let mut nested = String::new();
                if !payload.is_empty()
                    && depth < max_depth
                    && render_into(payload, depth + 1, max_depth, &mut nested).is_ok()
                {
                    writeln!(out, "{}{} {{", indent, number)
                        .and_then(|_| out.write_str(&nested))
                        .and_then(|_| writeln!(out, "{}}}", indent))
                } else if let Ok(s) = std::str::from_utf8(payload) {
                    writeln!(out, "{}{}: {:?}", indent, number, s)
                } else {
                    writeln!(out, "{}{}: <{}>", indent, number, hex(payload))
                }
            }
        };
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_message() {
        let buf = [8, 150, 1, 18, 3, b'h', b'i', b'!', 29, 1, 0, 0, 0];
        let text = render(&buf, 8).unwrap();
        assert_eq!("1: 150\n2: \"hi!\"\n3: 0x00000001\n", text);
    }

    #[test]
    fn nested_message() {
        let buf = [10, 2, 8, 7, 16, 1];
        let text = render(&buf, 8).unwrap();
        assert_eq!("1 {\n  1: 7\n}\n2: 1\n", text);
    }

    #[test]
    fn depth_zero_shows_bytes() {
        let buf = [10, 2, 8, 7];
        let text = render(&buf, 0).unwrap();
        assert_eq!("1: \"\\u{8}\\u{7}\"\n", text);
    }

    #[test]
    fn binary_payload_is_hex() {
        let buf = [10, 2, 0xff, 0xfe];
        let text = render(&buf, 8).unwrap();
        assert_eq!("1: <fffe>\n", text);
    }

    #[test]
    fn reserved_field_numbers_render() {
        // 19000 << 3 as a varint, then 1
        let buf = [192, 163, 9, 1];
        let text = render(&buf, 8).unwrap();
        assert_eq!("19000: 1\n", text);
    }

    #[test]
    fn truncated_is_an_error() {
        assert!(render(&[10, 5, 1], 8).is_err());
    }
}
