// Copyright (c) 2023-2024 The Ledger MW Project

//! Validation and encoding helpers shared across handlers and display code

use core::str::from_utf8;

use emstr::{helpers::Fractional, EncodeStr};

/// Lookup table for hex encoding
const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Check whether a byte is a printable ASCII character
pub fn is_printable_character(character: u8) -> bool {
    (b' '..=b'~').contains(&character)
}

/// Uppercase an ASCII character, other bytes pass through unchanged
pub fn to_uppercase(character: u8) -> u8 {
    character.to_ascii_uppercase()
}

/// Lowercase an ASCII character, other bytes pass through unchanged
pub fn to_lowercase(character: u8) -> u8 {
    character.to_ascii_lowercase()
}

/// Reverse the byte order of a value in place
pub fn swap_endianness(value: &mut [u8]) {
    value.reverse();
}

/// Encode a value as fixed-width lowercase hex into `result`
///
/// `result` must hold exactly two characters per input byte.
pub fn to_hex_string<'a>(result: &'a mut [u8], value: &[u8]) -> &'a str {
    debug_assert!(result.len() >= value.len() * 2);

    for (i, b) in value.iter().enumerate() {
        result[i * 2] = HEX_CHARS[(b >> 4) as usize];
        result[i * 2 + 1] = HEX_CHARS[(b & 0x0f) as usize];
    }

    // Output is built from the lookup table so always valid ASCII
    from_utf8(&result[..value.len() * 2]).unwrap_or("")
}

/// Number of characters in the decimal encoding of a value
pub fn string_length(value: u64) -> usize {
    let mut length = 1;
    let mut v = value / 10;

    while v != 0 {
        length += 1;
        v /= 10;
    }

    length
}

/// Write the decimal encoding of a value into `result`, returning the
/// number of bytes written
pub fn write_decimal(result: &mut [u8], value: u64) -> Result<usize, emstr::Error> {
    emstr::write!(&mut result[..], value)
}

/// Format a value with the given number of fractional digits
///
/// A fractional digit count of zero formats the plain integer; otherwise the
/// value is scaled down by `10^fractional_digits` with trailing zeros
/// trimmed, matching on-device amount display.
pub fn to_string(result: &mut [u8], value: u64, fractional_digits: u8) -> Result<&str, emstr::Error> {
    let n = if fractional_digits == 0 {
        emstr::write!(&mut result[..], value)?
    } else {
        let scalar = 10i64.saturating_pow(fractional_digits as u32);
        emstr::write!(&mut result[..], Fractional::<i64>::new(value as i64, scalar))?
    };

    // Decimal output is always valid ASCII
    Ok(from_utf8(&result[..n]).unwrap_or(""))
}
