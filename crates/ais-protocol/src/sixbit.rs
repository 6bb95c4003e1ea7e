//! 6-bit ASCII Armor
//!
//! AIVDM payloads carry six bits per printable character. Values 0-39 map to
//! `'0'..='W'` and values 40-63 skip the gap to `` '`'..='w' ``.

use crate::bits::BitBuffer;

/// The 64-symbol payload alphabet, indexed by 6-bit value
pub const ALPHABET: &[u8; 64] =
    b"0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVW`abcdefghijklmnopqrstuvw";

/// Number of padding bits needed to bring `bit_len` up to a multiple of 6
pub fn calculate_fill_bits(bit_len: usize) -> u8 {
    ((6 - bit_len % 6) % 6) as u8
}

/// Armor a bit buffer, zero-padding the final group
pub fn encode_binary_to_6bit(bits: &BitBuffer) -> String {
    let mut padded = bits.clone();
    padded.pad_to_multiple(6);

    padded
        .chunks(6)
        .map(|group| {
            let value = group.read_unsigned(0, 6).unwrap_or(0) as usize;
            ALPHABET[value] as char
        })
        .collect()
}

/// Inverse of [`encode_binary_to_6bit`]
///
/// Characters outside the alphabet decode as six zero bits.
pub fn decode_6bit_to_binary(payload: &str) -> BitBuffer {
    let mut bits = BitBuffer::with_capacity(payload.len() * 6);
    for c in payload.chars() {
        bits.push_unsigned(u64::from(char_value(c).unwrap_or(0)), 6);
    }
    bits
}

/// 6-bit value of a payload character, `None` if it is not in the alphabet
pub fn char_value(c: char) -> Option<u8> {
    let code = c as u32;
    let value = match code {
        48..=87 => code - 48,
        96..=119 => code - 56,
        _ => return None,
    };
    Some(value as u8)
}

/// Whether every character of `payload` belongs to the armor alphabet
pub fn is_valid_6bit(payload: &str) -> bool {
    payload.chars().all(|c| char_value(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armor(bits: &str) -> String {
        encode_binary_to_6bit(&bits.parse().unwrap())
    }

    #[test]
    fn test_alphabet_fixtures() {
        assert_eq!(armor("000001000010000011"), "123");
        assert_eq!(armor("111111"), "w");
        assert_eq!(armor("000000"), "0");
    }

    #[test]
    fn test_alphabet_boundaries() {
        assert_eq!(ALPHABET[39], b'W');
        assert_eq!(ALPHABET[40], b'`');
        assert_eq!(ALPHABET[63], b'w');
        for (value, &symbol) in ALPHABET.iter().enumerate() {
            assert_eq!(char_value(symbol as char), Some(value as u8));
        }
    }

    #[test]
    fn test_padding() {
        // 4 bits pad to one full character
        assert_eq!(armor("0001"), "4");
        assert_eq!(calculate_fill_bits(4), 2);
    }

    #[test]
    fn test_fill_bits() {
        assert_eq!(calculate_fill_bits(0), 0);
        assert_eq!(calculate_fill_bits(168), 0);
        assert_eq!(calculate_fill_bits(424), 2);
        assert_eq!(calculate_fill_bits(337), 5);
    }

    #[test]
    fn test_decode_unknown_char() {
        assert_eq!(decode_6bit_to_binary("X").to_string(), "000000");
        assert_eq!(decode_6bit_to_binary("1X").to_string(), "000001000000");
    }

    #[test]
    fn test_is_valid_6bit() {
        assert!(is_valid_6bit("13HOI:0P1kG?Vl@EWFk3NReh0000"));
        assert!(!is_valid_6bit("13HOI:0P1kG?Vl@EWFk3NReh000X"));
        assert!(!is_valid_6bit("abc,"));
    }
}
