//! Wiegand 26-bit frame representation and card identifier decoding.

use core::fmt;

/// Bits in a Wiegand 26 frame.
pub const FRAME_BITS: u8 = 26;

const FRAME_MASK: u32 = (1 << FRAME_BITS) - 1;

/// Reader data line. D0 pulses encode a 0 bit, D1 pulses a 1 bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    D0,
    D1,
}

impl Line {
    pub fn bit(self) -> u32 {
        match self {
            Line::D0 => 0,
            Line::D1 => 1,
        }
    }
}

/// A complete 26-bit frame, first received bit in bit 25.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    raw: u32,
}

impl Frame {
    /// Build a frame from its 26-bit value. Higher bits are discarded.
    pub const fn from_raw(raw: u32) -> Self {
        Self { raw: raw & FRAME_MASK }
    }

    /// Parse the ASCII form, e.g. `"01000000000101111000000000"`.
    /// Returns `None` unless the input is exactly 26 `0`/`1` characters.
    pub fn from_bit_str(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != FRAME_BITS as usize {
            return None;
        }
        let mut raw = 0u32;
        for &b in bytes {
            let bit = match b {
                b'0' => 0,
                b'1' => 1,
                _ => return None,
            };
            raw = (raw << 1) | bit;
        }
        Some(Self { raw })
    }

    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// Bit at `index`, counting from the first received bit (0..26).
    pub fn bit(&self, index: u8) -> Option<u8> {
        if index >= FRAME_BITS {
            return None;
        }
        Some(((self.raw >> (FRAME_BITS - 1 - index)) & 1) as u8)
    }

    /// Card identifier carried by this frame.
    pub fn card_id(&self) -> CardId {
        decode_26(self)
    }

    /// Check the H10301 parity bits: leading even parity over the upper 12
    /// data bits, trailing odd parity over the lower 12.
    ///
    /// Diagnostic only; a mismatch does not invalidate the identifier.
    pub fn parity_ok(&self) -> bool {
        let leading = (self.raw >> 25) & 1;
        let trailing = self.raw & 1;
        let data = (self.raw >> 1) & 0xFF_FFFF;

        let upper = data >> 12;
        let lower = data & 0xFFF;
        let even_ok = (upper.count_ones() % 2) == leading;
        let odd_ok = (lower.count_ones() % 2) != trailing;
        even_ok && odd_ok
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..FRAME_BITS).rev() {
            let c = if (self.raw >> i) & 1 == 1 { '1' } else { '0' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

/// Decoded 16-bit card identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CardId(pub u16);

impl CardId {
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the card number: drop the trailing parity bit, keep the next 16.
/// Facility code and leading parity are discarded.
pub fn decode_26(frame: &Frame) -> CardId {
    CardId(((frame.raw >> 1) & 0xFFFF) as u16)
}
