//! Variable-byte integer codec for posting blocks.
//!
//! Each value is cut into 7-bit groups which are written most significant
//! first. The high bit of a byte is the terminal flag: it is set only on the
//! last group of a value (the original least significant chunk), so a decoder
//! shifts payloads into an accumulator until it sees a byte >= 0x80.
//!
//! ```text
//!   5      -> 1000_0101
//!   128    -> 0000_0001 1000_0000
//!   16384  -> 0000_0001 0000_0000 1000_0000
//! ```

use crate::error::CodecError;

const PAYLOAD_MASK: u8 = 0x7F;
const TERMINAL: u8 = 0x80;
/// A u32 never needs more than five 7-bit groups.
const MAX_GROUPS: usize = 5;

/// Append the encoding of `value` to `out`.
pub fn encode(value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_GROUPS];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest as u8) & PAYLOAD_MASK;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    // groups[0] is the least significant chunk and goes out last, flagged.
    for i in (1..len).rev() {
        out.push(groups[i]);
    }
    out.push(groups[0] | TERMINAL);
}

pub fn encode_all<I: IntoIterator<Item = u32>>(values: I, out: &mut Vec<u8>) {
    for v in values {
        encode(v, out);
    }
}

/// Streaming decoder over a byte slice.
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<u32, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let start = self.pos;
        let mut acc: u64 = 0;
        while self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            self.pos += 1;
            acc = (acc << 7) | u64::from(byte & PAYLOAD_MASK);
            if acc > u64::from(u32::MAX) || self.pos - start > MAX_GROUPS {
                self.pos = self.bytes.len();
                return Some(Err(CodecError::Overflow { position: start }));
            }
            if byte & TERMINAL != 0 {
                return Some(Ok(acc as u32));
            }
        }
        Some(Err(CodecError::Truncated { pending: self.pos - start }))
    }
}

/// Decode every value in `bytes`.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<u32>, CodecError> {
    Decoder::new(bytes).collect()
}
