//! Generic table-driven fuse decoder

use core::slice;

use super::interpret::{FieldValue, RESERVED};
use super::types::{FieldMeaning, FuseByte, FuseFieldDescriptor, FuseLayout, RawFuseBytes};
use crate::chip::ChipProfile;

/// One decoded fuse field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedField {
    /// Byte the field lives in
    pub byte: FuseByte,
    /// Bits of that byte belonging to the field
    pub mask: u8,
    /// Flag text, interpreter title, or [`RESERVED`]
    pub label: &'static str,
    /// Field bits shifted down to bit 0
    pub raw: u8,
    /// Interpreted value
    pub value: FieldValue,
}

/// Decode a single field
pub fn decode_field(
    field: &FuseFieldDescriptor,
    raw: &RawFuseBytes,
    base_boot_size: u32,
) -> DecodedField {
    let normalized = field.normalized(raw);
    let (label, value) = match field.meaning {
        FieldMeaning::Flag(text) => (text, FieldValue::Flag(field.masked(raw) == 0)),
        FieldMeaning::Special(interp) => (interp.title(), interp.interpret(normalized, base_boot_size)),
        FieldMeaning::Reserved => (RESERVED, FieldValue::Raw(normalized)),
    };

    DecodedField {
        byte: field.byte,
        mask: field.mask,
        label,
        raw: normalized,
        value,
    }
}

/// Lazy decoder over a fuse layout
///
/// Yields one [`DecodedField`] per descriptor in layout order. Decoding is
/// a pure function of the layout and bytes, so a clone taken before
/// iterating walks the same fields again.
#[derive(Debug, Clone)]
pub struct FieldDecoder<'a> {
    fields: slice::Iter<'a, FuseFieldDescriptor>,
    raw: RawFuseBytes,
    base_boot_size: u32,
}

impl Iterator for FieldDecoder<'_> {
    type Item = DecodedField;

    fn next(&mut self) -> Option<Self::Item> {
        self.fields
            .next()
            .map(|f| decode_field(f, &self.raw, self.base_boot_size))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.fields.size_hint()
    }
}

impl ExactSizeIterator for FieldDecoder<'_> {}

/// Decode raw bytes against an explicit layout
pub fn decode_layout<'a>(
    layout: &'a FuseLayout,
    raw: &RawFuseBytes,
    base_boot_size: u32,
) -> FieldDecoder<'a> {
    FieldDecoder {
        fields: layout.fields.iter(),
        raw: *raw,
        base_boot_size,
    }
}

/// Decode raw bytes with a chip's own layout
///
/// Returns `None` when the profile has no fuse information.
pub fn decode(profile: &ChipProfile, raw: &RawFuseBytes) -> Option<FieldDecoder<'static>> {
    profile
        .fuse_layout
        .map(|layout| decode_layout(layout, raw, profile.base_boot_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{self, layouts};
    use crate::fuse::Interpreter;
    use alloc::vec::Vec;

    fn atmega328p() -> &'static ChipProfile {
        chip::find_by_signature([0x1E, 0x95, 0x0F]).unwrap()
    }

    #[test]
    fn test_flag_polarity_single_bit() {
        let field = FuseFieldDescriptor::flag(FuseByte::High, 0x08, "EEPROM");
        let programmed = RawFuseBytes::new(0, 0xF7, 0, 0, 0);
        let erased = RawFuseBytes::new(0, 0xFF, 0, 0, 0);

        assert_eq!(decode_field(&field, &programmed, 0).value, FieldValue::Flag(true));
        assert_eq!(decode_field(&field, &erased, 0).value, FieldValue::Flag(false));
    }

    #[test]
    fn test_flag_polarity_multi_bit() {
        let field = FuseFieldDescriptor::flag(FuseByte::Low, 0x06, "two bits");
        for value in 0..=u8::MAX {
            let raw = RawFuseBytes::new(value, 0, 0, 0, 0);
            let decoded = decode_field(&field, &raw, 0);
            assert_eq!(decoded.value, FieldValue::Flag(value & 0x06 == 0));
        }
    }

    #[test]
    fn test_reserved_descriptor() {
        let field = FuseFieldDescriptor::reserved(FuseByte::Extended, 0xF8);
        let raw = RawFuseBytes::new(0, 0, 0xFD, 0, 0);
        let decoded = decode_field(&field, &raw, 0);
        assert_eq!(decoded.label, RESERVED);
        assert_eq!(decoded.value, FieldValue::Raw(0x1F));
    }

    #[test]
    fn test_normalized_values_within_mask() {
        for chip in chip::CHIPS.iter().filter(|c| c.fuse_layout.is_some()) {
            for value in [0x00, 0x55, 0xAA, 0xFF] {
                let raw = RawFuseBytes::new(value, value, value, value, value);
                for (field, desc) in decode(chip, &raw)
                    .unwrap()
                    .zip(chip.fuse_layout.unwrap().fields)
                {
                    assert!(field.raw <= desc.max_value(), "{} {:?}", chip.name, desc);
                }
            }
        }
    }

    #[test]
    fn test_decode_follows_layout_order() {
        let profile = atmega328p();
        let raw = RawFuseBytes::new(0xFF, 0xDE, 0xFD, 0xCF, 0x9A);
        let labels: Vec<_> = decode(profile, &raw).unwrap().map(|f| f.label).collect();
        let expected: Vec<_> = layouts::ATMEGA328P
            .fields
            .iter()
            .map(|f| decode_field(f, &raw, 512).label)
            .collect();
        assert_eq!(labels, expected);
        assert_eq!(labels.len(), 15);
    }

    #[test]
    fn test_decode_is_restartable() {
        let raw = RawFuseBytes::new(0x62, 0xDF, 0xFF, 0xFF, 0x00);
        let decoder = decode(atmega328p(), &raw).unwrap();
        let first: Vec<_> = decoder.clone().collect();
        let second: Vec<_> = decoder.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uno_fuses() {
        // Arduino Uno factory fuses
        let raw = RawFuseBytes::new(0xFF, 0xDE, 0xFD, 0xCF, 0x9A);
        let fields: Vec<_> = decode(atmega328p(), &raw).unwrap().collect();

        let find = |label: &str| fields.iter().find(|f| f.label == label).unwrap().value;
        assert_eq!(find("Enable Serial (ICSP) Programming"), FieldValue::Flag(true));
        assert_eq!(find("Boot into bootloader"), FieldValue::Flag(true));
        assert_eq!(find("Divide clock by 8"), FieldValue::Flag(false));
        assert_eq!(find(Interpreter::BootSize.title()), FieldValue::BootSize(512));
        assert_eq!(
            find(Interpreter::ClockSource.title()),
            FieldValue::Text("low-power crystal")
        );
        assert_eq!(
            find(Interpreter::BrownOut.title()),
            FieldValue::Text("2.7V")
        );
        assert_eq!(
            find(Interpreter::LockBits.title()),
            FieldValue::Text("1 - No memory lock features enabled")
        );
        assert_eq!(
            find(Interpreter::BootProtection.title()),
            FieldValue::Text("3 - LPM and SPM prohibited in Boot Loader Section")
        );
    }

    #[test]
    fn test_no_layout() {
        let tiny84 = chip::find_by_name("ATtiny84").unwrap();
        assert!(decode(tiny84, &RawFuseBytes::default()).is_none());
    }
}
