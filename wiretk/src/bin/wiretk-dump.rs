//! Print the fields of an encoded message without a schema.  Reads the message from stdin unless
//! --input names a file.

use std::io::Read;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

#[derive(CommandLine, Debug, Eq, PartialEq)]
struct DumpOptions {
    #[arrrg(optional, "Read the message from this file instead of stdin.", "PATH")]
    input: String,
    #[arrrg(flag, "Treat the input as hexadecimal text.")]
    hex: bool,
    #[arrrg(optional, "Expand nested messages at most this deep.", "DEPTH")]
    depth: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            input: String::new(),
            hex: false,
            depth: 8,
        }
    }
}

fn unhex(text: &[u8]) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

fn main() {
    let (options, free) = DumpOptions::from_command_line_relaxed(
        "Usage: wiretk-dump [--input PATH] [--hex] [--depth DEPTH]",
    );
    if !free.is_empty() {
        eprintln!("free arguments are not accepted");
        std::process::exit(1);
    }
    let mut raw = Vec::new();
    let read = if options.input.is_empty() {
        std::io::stdin().read_to_end(&mut raw).map(|_| ())
    } else {
        std::fs::read(&options.input).map(|bytes| raw = bytes)
    };
    if let Err(e) = read {
        eprintln!("could not read input: {e}");
        std::process::exit(1);
    }
    let buf = if options.hex {
        match unhex(&raw) {
            Some(buf) => buf,
            None => {
                eprintln!("input is not hexadecimal");
                std::process::exit(1);
            }
        }
    } else {
        raw
    };
    match wiretk::dump::render(&buf, options.depth) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("could not parse message: {e}");
            std::process::exit(1);
        }
    }
}
