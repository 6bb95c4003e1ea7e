//! Bit-Field Codec
//!
//! AIS payloads are fixed-layout bit strings. [`BitBuffer`] is the owned bit
//! sequence every message is assembled into, and the `*_raw` functions turn
//! physical quantities into the integers ITU-R M.1371 puts on the wire.
//!
//! # Out-of-range input
//!
//! Encoding never fails. Values outside a field's range are clamped, and
//! absent values (the documented not-available markers, or NaN) are replaced
//! with the field's sentinel from [`sentinel`]. Writing a value that does not
//! fit its width saturates, so every field always occupies exactly its width.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::ParseError;

/// ITU "not available" markers, both as physical input values and as the
/// raw field values they encode to
pub mod sentinel {
    /// Latitude not available (degrees)
    pub const LATITUDE_DEG: f64 = 91.0;
    /// Longitude not available (degrees)
    pub const LONGITUDE_DEG: f64 = 181.0;
    /// Speed over ground not available (knots)
    pub const SOG_KNOTS: f64 = 102.3;
    /// Course over ground not available (degrees)
    pub const COG_DEG: f64 = 360.0;
    /// True heading not available
    pub const HEADING: u16 = 511;
    /// Rate of turn not available
    pub const ROT: i32 = 128;
    /// Draught at or above this value is reported as 0 (not available)
    pub const DRAUGHT_M: f64 = 25.5;
    /// UTC second not available
    pub const TIMESTAMP: u8 = 60;

    /// 91 degrees in 1/10000 minute
    pub const LATITUDE_RAW: i64 = 0x341_2140;
    /// 181 degrees in 1/10000 minute
    pub const LONGITUDE_RAW: i64 = 0x679_1AC0;
    pub const SOG_RAW: u64 = 1023;
    pub const COG_RAW: u64 = 3600;
    pub const HEADING_RAW: u64 = 511;
    /// -128 as an 8-bit two's complement pattern
    pub const ROT_RAW: u64 = 128;

    pub const ETA_MONTH: u8 = 0;
    pub const ETA_DAY: u8 = 0;
    pub const ETA_HOUR: u8 = 24;
    pub const ETA_MINUTE: u8 = 60;
}

/// Position resolution: 1/10000 minute per unit
pub const POSITION_SCALE: f64 = 600_000.0;

/// Clamp bound for encoded latitude
pub const LATITUDE_LIMIT: i64 = 324_000_000;
/// Clamp bound for encoded longitude
pub const LONGITUDE_LIMIT: i64 = 648_000_000;

const ROT_FACTOR: f64 = 4.733;

/// An owned sequence of bits, most significant bit of every field first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    bits: Vec<bool>,
}

impl BitBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    /// Number of bits in the buffer
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Borrow the raw bits
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append an unsigned field, saturating to the largest value `width` bits hold
    pub fn push_unsigned(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64, "field width {width} exceeds 64 bits");
        let max = if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        let value = value.min(max);
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    /// Append a two's-complement signed field, saturating to the signed range
    pub fn push_signed(&mut self, value: i64, width: usize) {
        debug_assert!((1..64).contains(&width), "invalid signed width {width}");
        let min = -(1i64 << (width - 1));
        let max = (1i64 << (width - 1)) - 1;
        let mask = (1u64 << width) - 1;
        let raw = (value.clamp(min, max) as u64) & mask;
        self.push_unsigned(raw, width);
    }

    /// Append `chars` characters of 6-bit text, space-padded or truncated
    pub fn push_text(&mut self, text: &str, chars: usize) {
        let padded = text.chars().chain(std::iter::repeat(' ')).take(chars);
        for c in padded {
            self.push_unsigned(u64::from(char_to_sixbit(c)), 6);
        }
    }

    /// Append every bit of another buffer
    pub fn extend_from(&mut self, other: &BitBuffer) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Zero-pad until the length is a multiple of `multiple`
    pub fn pad_to_multiple(&mut self, multiple: usize) {
        while self.bits.len() % multiple != 0 {
            self.bits.push(false);
        }
    }

    /// Shorten the buffer to `len` bits
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    /// Copy out a sub-range of bits
    pub fn slice(&self, range: Range<usize>) -> BitBuffer {
        Self {
            bits: self.bits[range].to_vec(),
        }
    }

    /// Split into consecutive chunks of at most `size` bits
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = BitBuffer> + '_ {
        self.bits.chunks(size).map(|c| BitBuffer { bits: c.to_vec() })
    }

    /// Read an unsigned field, `None` if it runs past the end
    pub fn read_unsigned(&self, offset: usize, width: usize) -> Option<u64> {
        let field = self.bits.get(offset..offset + width)?;
        Some(field.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b)))
    }

    /// Read a two's-complement signed field
    pub fn read_signed(&self, offset: usize, width: usize) -> Option<i64> {
        let raw = self.read_unsigned(offset, width)?;
        if width > 0 && raw & (1 << (width - 1)) != 0 {
            Some(raw as i64 - (1i64 << width))
        } else {
            Some(raw as i64)
        }
    }

    /// Read `chars` characters of 6-bit text, trailing padding removed
    pub fn read_text(&self, offset: usize, chars: usize) -> Option<String> {
        let mut text = String::with_capacity(chars);
        for i in 0..chars {
            let v = self.read_unsigned(offset + i * 6, 6)?;
            text.push(sixbit_to_char(v as u8));
        }
        Some(text.trim_end_matches([' ', '@']).to_string())
    }
}

impl From<Vec<bool>> for BitBuffer {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl FromStr for BitBuffer {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ParseError::InvalidBinary(other)),
            })
            .collect()
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Map a character to its 6-bit text value
///
/// `@`..`_` map to 0..31 and space..`?` keep their code (32..63). Lowercase
/// letters fold onto uppercase; anything else becomes 0 (`@`).
pub fn char_to_sixbit(c: char) -> u8 {
    let c = c.to_ascii_uppercase();
    match c as u32 {
        v @ 64..=95 => (v - 64) as u8,
        v @ 32..=63 => v as u8,
        _ => 0,
    }
}

/// Inverse of [`char_to_sixbit`]
pub fn sixbit_to_char(value: u8) -> char {
    let value = value & 0x3F;
    if value < 32 {
        (value + 64) as char
    } else {
        value as char
    }
}

/// Latitude in degrees to 1/10000 minute
pub fn latitude_raw(degrees: f64) -> i64 {
    if degrees.is_nan() || degrees == sentinel::LATITUDE_DEG {
        return sentinel::LATITUDE_RAW;
    }
    scale_position(degrees, LATITUDE_LIMIT)
}

/// Longitude in degrees to 1/10000 minute
pub fn longitude_raw(degrees: f64) -> i64 {
    if degrees.is_nan() || degrees == sentinel::LONGITUDE_DEG {
        return sentinel::LONGITUDE_RAW;
    }
    scale_position(degrees, LONGITUDE_LIMIT)
}

fn scale_position(degrees: f64, limit: i64) -> i64 {
    let scaled = (degrees * POSITION_SCALE).round();
    (scaled.clamp(-limit as f64, limit as f64)) as i64
}

/// Speed over ground in knots to 0.1 knot units
pub fn sog_raw(knots: f64) -> u64 {
    if knots.is_nan() || knots >= sentinel::SOG_KNOTS {
        return sentinel::SOG_RAW;
    }
    (knots * 10.0).round().clamp(0.0, 1022.0) as u64
}

/// Course over ground in degrees to 0.1 degree units
pub fn cog_raw(degrees: f64) -> u64 {
    if degrees.is_nan() || degrees >= sentinel::COG_DEG {
        return sentinel::COG_RAW;
    }
    (degrees * 10.0).round().clamp(0.0, 3599.0) as u64
}

/// True heading in whole degrees
pub fn heading_raw(heading: u16) -> u64 {
    if heading >= sentinel::HEADING {
        return sentinel::HEADING_RAW;
    }
    u64::from(heading.min(359))
}

/// Rate of turn sensor value (degrees/minute) to the 8-bit ROT indicator
///
/// The result is the two's-complement bit pattern ready for an 8-bit field.
pub fn rot_raw(rot: i32) -> u64 {
    if rot == sentinel::ROT {
        return sentinel::ROT_RAW;
    }
    if rot == 0 {
        return 0;
    }
    let magnitude = (ROT_FACTOR * f64::from(rot.unsigned_abs()).sqrt())
        .round()
        .min(127.0) as i64;
    let indicator = if rot < 0 { -magnitude } else { magnitude };
    (indicator as u64) & 0xFF
}

/// Draught in meters to 0.1 m units, 0 when not available
pub fn draught_raw(meters: f64) -> u64 {
    if meters.is_nan() || meters >= sentinel::DRAUGHT_M {
        return 0;
    }
    (meters * 10.0).round().clamp(0.0, 255.0) as u64
}

/// Latitude field back to degrees, `None` for the sentinel
pub fn decode_latitude(raw: i64) -> Option<f64> {
    (raw != sentinel::LATITUDE_RAW).then(|| raw as f64 / POSITION_SCALE)
}

/// Longitude field back to degrees, `None` for the sentinel
pub fn decode_longitude(raw: i64) -> Option<f64> {
    (raw != sentinel::LONGITUDE_RAW).then(|| raw as f64 / POSITION_SCALE)
}

pub fn decode_sog(raw: u64) -> Option<f64> {
    (raw != sentinel::SOG_RAW).then(|| raw as f64 / 10.0)
}

pub fn decode_cog(raw: u64) -> Option<f64> {
    (raw < sentinel::COG_RAW).then(|| raw as f64 / 10.0)
}

pub fn decode_heading(raw: u64) -> Option<u16> {
    (raw != sentinel::HEADING_RAW).then_some(raw as u16)
}

/// Signed 8-bit ROT indicator, `None` for the -128 sentinel
pub fn decode_rot(indicator: i64) -> Option<i32> {
    (indicator != -128).then_some(indicator as i32)
}
