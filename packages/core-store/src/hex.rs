//! Hex string decoding for MAC addresses, keys and similar settings.

/// Decode `input` into `out`, which must be filled exactly.
///
/// Spaces are ignored anywhere, an optional `0x`/`0X` prefix is stripped,
/// and either case is accepted. The remaining text must be exactly
/// `2 * out.len()` hex digits.
///
/// Returns `false` on a length mismatch, a non-hex character, or an empty
/// `out`. On failure `out` may have been partially written.
pub fn parse_hex_to_bytes(input: &str, out: &mut [u8]) -> bool {
    decode_into(input, out).is_some()
}

fn decode_into(input: &str, out: &mut [u8]) -> Option<()> {
    if out.is_empty() {
        return None;
    }

    let cleaned: Vec<u8> = input.bytes().filter(|b| *b != b' ').collect();
    let digits = match cleaned.as_slice() {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        all => all,
    };
    if digits.len() != out.len() * 2 {
        return None;
    }

    for (slot, pair) in out.iter_mut().zip(digits.chunks_exact(2)) {
        *slot = (nibble(pair[0])? << 4) | nibble(pair[1])?;
    }
    Some(())
}

fn nibble(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|value| value as u8)
}
