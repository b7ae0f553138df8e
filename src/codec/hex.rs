//! Hex text rules for patch documents.
//!
//! Offsets are bare hexadecimal (no `0x`), case-insensitive, and are written
//! back as at least eight uppercase digits. Byte payloads are hex pairs with
//! optional whitespace between them, written back as uppercase pairs joined by
//! single spaces.

use thiserror::Error;

/// Minimum rendered width of an offset. Wider offsets are never truncated.
pub const OFFSET_WIDTH: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("value is empty")]
    Empty,

    #[error("invalid hex digit {character:?} at position {index}")]
    InvalidDigit { character: char, index: usize },

    #[error("odd number of hex digits ({len})")]
    OddLength { len: usize },

    #[error("value does not fit in 64 bits")]
    TooLarge,
}

/// Parse a bare hex offset such as `00001A2B` or `1a2b`.
pub fn parse_offset(text: &str) -> Result<u64, HexError> {
    let digits = text.trim();
    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    // from_str_radix accepts a leading sign, which is not a valid offset.
    if let Some((index, character)) = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(HexError::InvalidDigit { character, index });
    }
    u64::from_str_radix(digits, 16).map_err(|_| HexError::TooLarge)
}

/// Parse spaced or unspaced hex pairs (`DE AD BE EF`, `deadbeef`) into bytes.
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, HexError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(HexError::Empty);
    }
    hex::decode(&compact).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidDigit {
            character: c,
            index,
        },
        _ => HexError::OddLength { len: compact.len() },
    })
}

pub fn format_offset(offset: u64) -> String {
    format!("{offset:0width$X}", width = OFFSET_WIDTH)
}

pub fn format_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&hex::encode_upper([*byte]));
    }
    out
}
