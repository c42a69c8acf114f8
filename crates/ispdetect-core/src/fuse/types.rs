//! Fuse data types

use core::fmt;

use super::interpret::Interpreter;

/// One of the four configuration bytes a field can live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum FuseByte {
    /// Low fuse byte
    Low,
    /// High fuse byte
    High,
    /// Extended fuse byte
    Extended,
    /// Lock bits
    Lock,
}

impl FuseByte {
    /// All fuse bytes in read order
    pub const ALL: [FuseByte; 4] = [
        FuseByte::Low,
        FuseByte::High,
        FuseByte::Extended,
        FuseByte::Lock,
    ];

    /// Short label used by avrdude-style tools
    pub const fn label(self) -> &'static str {
        match self {
            FuseByte::Low => "lfuse",
            FuseByte::High => "hfuse",
            FuseByte::Extended => "efuse",
            FuseByte::Lock => "lock",
        }
    }
}

impl fmt::Display for FuseByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration bytes read from the target
///
/// Read once per session and never interpreted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFuseBytes {
    /// Low fuse byte
    pub low: u8,
    /// High fuse byte
    pub high: u8,
    /// Extended fuse byte
    pub extended: u8,
    /// Lock byte
    pub lock: u8,
    /// Internal oscillator calibration byte
    pub calibration: u8,
}

impl RawFuseBytes {
    /// Create a new set of raw fuse bytes
    pub const fn new(low: u8, high: u8, extended: u8, lock: u8, calibration: u8) -> Self {
        Self {
            low,
            high,
            extended,
            lock,
            calibration,
        }
    }

    /// Get the value of one fuse byte
    pub const fn get(&self, byte: FuseByte) -> u8 {
        match byte {
            FuseByte::Low => self.low,
            FuseByte::High => self.high,
            FuseByte::Extended => self.extended,
            FuseByte::Lock => self.lock,
        }
    }

    /// All five bytes in read order
    pub const fn to_array(&self) -> [u8; 5] {
        [self.low, self.high, self.extended, self.lock, self.calibration]
    }
}

impl Default for RawFuseBytes {
    /// Every cell unprogrammed
    fn default() -> Self {
        Self::new(0xFF, 0xFF, 0xFF, 0xFF, 0xFF)
    }
}

/// What a fuse field means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMeaning {
    /// A single on/off feature, described by the text shown when it is set
    Flag(&'static str),
    /// A multi-bit field decoded by a table
    Special(Interpreter),
    /// Bits with no documented meaning
    Reserved,
}

/// One named bit-field within a fuse byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseFieldDescriptor {
    /// Byte the field lives in
    pub byte: FuseByte,
    /// Bits of that byte belonging to the field
    pub mask: u8,
    /// How to interpret the bits
    pub meaning: FieldMeaning,
}

impl FuseFieldDescriptor {
    /// A single on/off field
    pub const fn flag(byte: FuseByte, mask: u8, text: &'static str) -> Self {
        Self {
            byte,
            mask,
            meaning: FieldMeaning::Flag(text),
        }
    }

    /// A multi-bit field with a table interpreter
    pub const fn special(byte: FuseByte, mask: u8, interpreter: Interpreter) -> Self {
        Self {
            byte,
            mask,
            meaning: FieldMeaning::Special(interpreter),
        }
    }

    /// A field with no documented meaning
    pub const fn reserved(byte: FuseByte, mask: u8) -> Self {
        Self {
            byte,
            mask,
            meaning: FieldMeaning::Reserved,
        }
    }

    /// Bits selected by the mask, left in place
    pub const fn masked(&self, raw: &RawFuseBytes) -> u8 {
        raw.get(self.byte) & self.mask
    }

    /// Bits selected by the mask, shifted down so the lowest mask bit is bit 0
    ///
    /// A zero mask yields zero.
    pub const fn normalized(&self, raw: &RawFuseBytes) -> u8 {
        match self.masked(raw).checked_shr(self.mask.trailing_zeros()) {
            Some(v) => v,
            None => 0,
        }
    }

    /// Largest value [`normalized`](Self::normalized) can return
    pub const fn max_value(&self) -> u8 {
        match self.mask.checked_shr(self.mask.trailing_zeros()) {
            Some(v) => v,
            None => 0,
        }
    }
}

/// Ordered fuse field table for a family of chips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseLayout {
    /// Name of the chip the layout was first written for
    pub name: &'static str,
    /// Fields in display order
    pub fields: &'static [FuseFieldDescriptor],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_shifts_to_bit_zero() {
        let raw = RawFuseBytes::new(0b0010_0000, 0, 0, 0, 0);
        let field = FuseFieldDescriptor::special(FuseByte::Low, 0x30, Interpreter::StartUpTime);
        assert_eq!(field.masked(&raw), 0b0010_0000);
        assert_eq!(field.normalized(&raw), 0b10);
        assert_eq!(field.max_value(), 0b11);
    }

    #[test]
    fn test_zero_mask() {
        let raw = RawFuseBytes::default();
        let field = FuseFieldDescriptor::reserved(FuseByte::Lock, 0);
        assert_eq!(field.normalized(&raw), 0);
        assert_eq!(field.max_value(), 0);
    }

    #[test]
    fn test_get_by_byte() {
        let raw = RawFuseBytes::new(1, 2, 3, 4, 5);
        let values: [u8; 4] = FuseByte::ALL.map(|b| raw.get(b));
        assert_eq!(values, [1, 2, 3, 4]);
        assert_eq!(raw.to_array(), [1, 2, 3, 4, 5]);
    }
}
