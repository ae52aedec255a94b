//! Fuzz target for newline framing
//!
//! # Strategy
//!
//! Feed the same byte stream to the framer in arbitrary chunks and compare
//! against splitting the whole stream at once.
//!
//! # Invariants
//!
//! - Chunk boundaries never change the sequence of messages
//! - No message exceeds the configured limit
//! - Messages never contain a line feed and are never empty
//! - The buffer stays bounded by the limit plus a pending `\r`
//! - NEVER panic on arbitrary bytes

#![no_main]

use arbitrary::Arbitrary;
use auditview_proto::{strip_terminator, LineFramer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    max_len: u8,
    stream: Vec<u8>,
    chunk_sizes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let max_len = usize::from(input.max_len).max(1);
    let mut framer = LineFramer::new(max_len);
    let mut messages = Vec::new();
    let mut failed = false;

    let mut rest = input.stream.as_slice();
    let mut sizes = input.chunk_sizes.iter().cycle();
    while !rest.is_empty() && !failed {
        let size = sizes.next().map_or(rest.len(), |&s| usize::from(s).max(1)).min(rest.len());
        let (chunk, tail) = rest.split_at(size);
        rest = tail;

        framer.extend(chunk);
        loop {
            match framer.next_message() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(_) => {
                    failed = true;
                    break;
                },
            }
        }
        assert!(failed || framer.buffered_len() <= max_len + 1);
    }

    if !failed {
        messages.extend(framer.finish());
    }

    for message in &messages {
        assert!(!message.is_empty());
        assert!(!message.contains('\n'));
    }

    // Reference: split the whole stream in one go
    let expected: Vec<String> = input
        .stream
        .split(|&b| b == b'\n')
        .map(|line| (line.strip_suffix(b"\r").unwrap_or(line).len(), strip_terminator(line)))
        .take_while(|&(len, _)| len <= max_len)
        .map(|(_, message)| message)
        .filter(|message| !message.is_empty())
        .collect();

    if failed {
        assert!(messages.len() <= expected.len());
        assert_eq!(messages[..], expected[..messages.len()]);
    } else {
        assert_eq!(messages, expected);
    }
});
