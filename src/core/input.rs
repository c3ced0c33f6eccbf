use std::io::{BufRead, ErrorKind};

use memchr::memchr;

use crate::core::error::LabError;

/// Reads one line of raw bytes, without its `\n`.
///
/// Only the line feed is removed. A `\r` before it stays part of the
/// candidate, so `\r\n` input is one byte longer than the text typed.
///
/// Returns `None` when the stream ended before a single byte arrived. Read
/// errors end the line early; whatever was read up to that point is kept.
pub fn read_candidate<R: BufRead>(reader: &mut R) -> Option<Vec<u8>> {
    let mut line = Vec::new();
    let mut saw_bytes = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, read = line.len(), "input stream failed");
                break;
            }
        };

        if available.is_empty() {
            break;
        }
        saw_bytes = true;

        match memchr(b'\n', available) {
            Some(pos) => {
                line.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                return Some(line);
            }
            None => {
                let len = available.len();
                line.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }

    if !saw_bytes {
        return None;
    }
    Some(line)
}

/// Parses hex bytes typed by hand. Whitespace separates tokens and each
/// token may carry its own `0x` prefix, so `0x84 0x8a` and `848a` agree.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, LabError> {
    let digits: String = text
        .split_whitespace()
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();
    Ok(hex::decode(digits)?)
}
