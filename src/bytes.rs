//! Register/byte reinterpretation primitives
//!
//! Converts between register arrays (u16) and numeric types (i16, u32, f32,
//! f64) under configurable byte order and word swap, plus BCD packing.
//!
//! # Terminology
//! - **Byte order**: which assembled word becomes the most significant half
//!   of a multi-register value (and the byte layout inside each word).
//! - **Word swap**: exchanging which of two registers is treated as the
//!   first (high-order) word before byte-order assembly.
//!
//! In ABCD notation (A = MSB of a 32-bit value):
//! - big-endian, no swap   → ABCD
//! - big-endian, swapped   → CDAB (common in Modbus devices)
//! - little-endian, no swap → DCBA
//! - little-endian, swapped → BADC

use serde::{Deserialize, Serialize};

/// Byte order for multi-register values
///
/// Combined with the per-rule `word_swap` flag this selects one of the four
/// standard register layouts (ABCD / CDAB / DCBA / BADC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Network byte order, most significant word first (ABCD)
    #[default]
    BigEndian,
    /// Least significant byte first (DCBA)
    LittleEndian,
}

impl ByteOrder {
    /// Parse legacy string spellings used in device point tables
    ///
    /// Returns the byte order together with the implied word swap:
    /// - "ABCD", "BE", "BIG_ENDIAN" → (BigEndian, false)
    /// - "CDAB" → (BigEndian, true)
    /// - "DCBA", "LE", "LITTLE_ENDIAN" → (LittleEndian, false)
    /// - "BADC" → (LittleEndian, true)
    pub fn parse_legacy(s: &str) -> Option<(Self, bool)> {
        let normalized = s.to_uppercase().replace('-', "").replace('_', "");
        match normalized.as_str() {
            "ABCD" | "BE" | "BIGENDIAN" => Some((Self::BigEndian, false)),
            "CDAB" | "BIGENDIANSWAP" => Some((Self::BigEndian, true)),
            "DCBA" | "LE" | "LITTLEENDIAN" => Some((Self::LittleEndian, false)),
            "BADC" | "LITTLEENDIANSWAP" => Some((Self::LittleEndian, true)),
            _ => None,
        }
    }

    /// Descriptive label for result metadata
    pub fn label(&self, word_swap: bool) -> &'static str {
        match (self, word_swap) {
            (Self::BigEndian, false) => "big_endian",
            (Self::BigEndian, true) => "big_endian_swap",
            (Self::LittleEndian, false) => "little_endian",
            (Self::LittleEndian, true) => "little_endian_swap",
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BigEndian => write!(f, "big_endian"),
            Self::LittleEndian => write!(f, "little_endian"),
        }
    }
}

// ============================================================================
// Register to bytes
// ============================================================================

/// Convert 2 registers to 4 bytes under the given layout
pub fn regs_to_bytes_4(regs: &[u16; 2], order: ByteOrder, word_swap: bool) -> [u8; 4] {
    let [h0, h1] = [regs[0].to_be_bytes(), regs[1].to_be_bytes()];

    match (order, word_swap) {
        (ByteOrder::BigEndian, false) => [h0[0], h0[1], h1[0], h1[1]], // ABCD
        (ByteOrder::BigEndian, true) => [h1[0], h1[1], h0[0], h0[1]],  // CDAB
        (ByteOrder::LittleEndian, false) => [h1[1], h1[0], h0[1], h0[0]], // DCBA
        (ByteOrder::LittleEndian, true) => [h0[1], h0[0], h1[1], h1[0]], // BADC
    }
}

/// Convert 4 registers to 8 bytes under the given layout
pub fn regs_to_bytes_8(regs: &[u16; 4], order: ByteOrder, word_swap: bool) -> [u8; 8] {
    let [h0, h1, h2, h3] = [
        regs[0].to_be_bytes(),
        regs[1].to_be_bytes(),
        regs[2].to_be_bytes(),
        regs[3].to_be_bytes(),
    ];

    match (order, word_swap) {
        (ByteOrder::BigEndian, false) => [
            h0[0], h0[1], h1[0], h1[1], h2[0], h2[1], h3[0], h3[1], // ABCDEFGH
        ],
        (ByteOrder::BigEndian, true) => [
            h3[0], h3[1], h2[0], h2[1], h1[0], h1[1], h0[0], h0[1], // GHEFCDAB
        ],
        (ByteOrder::LittleEndian, false) => [
            h3[1], h3[0], h2[1], h2[0], h1[1], h1[0], h0[1], h0[0], // HGFEDCBA
        ],
        (ByteOrder::LittleEndian, true) => [
            h0[1], h0[0], h1[1], h1[0], h2[1], h2[0], h3[1], h3[0], // BADCFEHG
        ],
    }
}

// ============================================================================
// Register to numeric types
// ============================================================================

/// Reinterpret a single register as signed two's complement
pub fn reg_to_i16(reg: u16) -> i16 {
    reg as i16
}

/// Convert 2 registers to u32
pub fn regs_to_u32(regs: &[u16; 2], order: ByteOrder, word_swap: bool) -> u32 {
    u32::from_be_bytes(regs_to_bytes_4(regs, order, word_swap))
}

/// Convert 2 registers to i32
pub fn regs_to_i32(regs: &[u16; 2], order: ByteOrder, word_swap: bool) -> i32 {
    i32::from_be_bytes(regs_to_bytes_4(regs, order, word_swap))
}

/// Convert 2 registers to f32
pub fn regs_to_f32(regs: &[u16; 2], order: ByteOrder, word_swap: bool) -> f32 {
    f32::from_be_bytes(regs_to_bytes_4(regs, order, word_swap))
}

/// Convert 4 registers to f64
pub fn regs_to_f64(regs: &[u16; 4], order: ByteOrder, word_swap: bool) -> f64 {
    f64::from_be_bytes(regs_to_bytes_8(regs, order, word_swap))
}

// ============================================================================
// Bytes to registers (encode direction)
// ============================================================================

/// Convert 4 bytes back to 2 registers under the given layout
///
/// Inverse of [`regs_to_bytes_4`].
pub fn bytes_4_to_regs(bytes: &[u8; 4], order: ByteOrder, word_swap: bool) -> [u16; 2] {
    let regs = match (order, word_swap) {
        (ByteOrder::BigEndian, false) => [[bytes[0], bytes[1]], [bytes[2], bytes[3]]],
        (ByteOrder::BigEndian, true) => [[bytes[2], bytes[3]], [bytes[0], bytes[1]]],
        (ByteOrder::LittleEndian, false) => [[bytes[3], bytes[2]], [bytes[1], bytes[0]]],
        (ByteOrder::LittleEndian, true) => [[bytes[1], bytes[0]], [bytes[3], bytes[2]]],
    };
    [u16::from_be_bytes(regs[0]), u16::from_be_bytes(regs[1])]
}

/// Convert 8 bytes back to 4 registers under the given layout
///
/// Inverse of [`regs_to_bytes_8`].
pub fn bytes_8_to_regs(bytes: &[u8; 8], order: ByteOrder, word_swap: bool) -> [u16; 4] {
    let word = |a: u8, b: u8| u16::from_be_bytes([a, b]);
    match (order, word_swap) {
        (ByteOrder::BigEndian, false) => [
            word(bytes[0], bytes[1]),
            word(bytes[2], bytes[3]),
            word(bytes[4], bytes[5]),
            word(bytes[6], bytes[7]),
        ],
        (ByteOrder::BigEndian, true) => [
            word(bytes[6], bytes[7]),
            word(bytes[4], bytes[5]),
            word(bytes[2], bytes[3]),
            word(bytes[0], bytes[1]),
        ],
        (ByteOrder::LittleEndian, false) => [
            word(bytes[7], bytes[6]),
            word(bytes[5], bytes[4]),
            word(bytes[3], bytes[2]),
            word(bytes[1], bytes[0]),
        ],
        (ByteOrder::LittleEndian, true) => [
            word(bytes[1], bytes[0]),
            word(bytes[3], bytes[2]),
            word(bytes[5], bytes[4]),
            word(bytes[7], bytes[6]),
        ],
    }
}

// ============================================================================
// BCD packing
// ============================================================================

/// Decode a BCD-packed register (4 decimal digits, one per nibble)
///
/// Returns `None` if any nibble is not a decimal digit (0-9).
pub fn bcd_to_u16(word: u16) -> Option<u16> {
    let mut result = 0u16;
    for shift in [12u16, 8, 4, 0] {
        let nibble = (word >> shift) & 0x0F;
        if nibble > 9 {
            return None;
        }
        result = result * 10 + nibble;
    }
    Some(result)
}

/// Encode a decimal value (0-9999) into a BCD-packed register
///
/// Returns `None` if the value does not fit in 4 decimal digits.
pub fn u16_to_bcd(value: u16) -> Option<u16> {
    if value > 9999 {
        return None;
    }
    let digits = [value / 1000, (value / 100) % 10, (value / 10) % 10, value % 10];
    Some((digits[0] << 12) | (digits[1] << 8) | (digits[2] << 4) | digits[3])
}
