//! Compiled-in chip catalog

use super::layouts;
use super::types::ChipProfile;
use crate::fuse::{FuseByte, FuseLayout};

const KB: u32 = 1024;

const fn chip(
    signature: [u8; 3],
    name: &'static str,
    flash_size: u32,
    base_boot_size: u32,
    page_size: u32,
    boot_size_fuse: Option<FuseByte>,
    fuse_layout: Option<&'static FuseLayout>,
) -> ChipProfile {
    ChipProfile {
        signature,
        name,
        flash_size,
        base_boot_size,
        page_size,
        boot_size_fuse,
        fuse_layout,
        timed_writes: false,
    }
}

const fn timed(profile: ChipProfile) -> ChipProfile {
    ChipProfile {
        timed_writes: true,
        ..profile
    }
}

const HIGH: Option<FuseByte> = Some(FuseByte::High);
const EXT: Option<FuseByte> = Some(FuseByte::Extended);

/// Every known chip, searched in order
pub static CHIPS: &[ChipProfile] = &[
    // ATtiny84 family
    chip([0x1E, 0x91, 0x0B], "ATtiny24", 2 * KB, 0, 32, None, None),
    chip([0x1E, 0x92, 0x07], "ATtiny44", 4 * KB, 0, 64, None, None),
    chip([0x1E, 0x93, 0x0C], "ATtiny84", 8 * KB, 0, 64, None, None),
    // ATtiny85 family
    chip([0x1E, 0x91, 0x08], "ATtiny25", 2 * KB, 0, 32, None, Some(&layouts::ATMEGA48PA)),
    chip([0x1E, 0x92, 0x06], "ATtiny45", 4 * KB, 0, 64, None, Some(&layouts::ATMEGA48PA)),
    chip([0x1E, 0x93, 0x0B], "ATtiny85", 8 * KB, 0, 64, None, Some(&layouts::ATMEGA48PA)),
    // ATmega328 family
    chip([0x1E, 0x92, 0x0A], "ATmega48PA", 4 * KB, 0, 64, None, Some(&layouts::ATMEGA48PA)),
    chip([0x1E, 0x93, 0x0F], "ATmega88PA", 8 * KB, 256, 128, EXT, Some(&layouts::ATMEGA88PA)),
    chip([0x1E, 0x94, 0x0B], "ATmega168PA", 16 * KB, 256, 128, EXT, Some(&layouts::ATMEGA88PA)),
    chip([0x1E, 0x95, 0x0F], "ATmega328P", 32 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA328P)),
    // ATmega644 family
    chip([0x1E, 0x94, 0x0A], "ATmega164P", 16 * KB, 256, 128, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x95, 0x08], "ATmega324P", 32 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x96, 0x0A], "ATmega644P", 64 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    // ATmega2560 family
    chip([0x1E, 0x96, 0x08], "ATmega640", 64 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x97, 0x03], "ATmega1280", 128 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x97, 0x04], "ATmega1281", 128 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x98, 0x01], "ATmega2560", 256 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    chip([0x1E, 0x98, 0x02], "ATmega2561", 256 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    // AT90USB family
    chip([0x1E, 0x93, 0x82], "AT90USB82", 8 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA8U2)),
    chip([0x1E, 0x94, 0x82], "AT90USB162", 16 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA8U2)),
    // ATmega32U2 family
    chip([0x1E, 0x93, 0x89], "ATmega8U2", 8 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA8U2)),
    chip([0x1E, 0x94, 0x89], "ATmega16U2", 16 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA8U2)),
    chip([0x1E, 0x95, 0x8A], "ATmega32U2", 32 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA8U2)),
    // ATmega32U4 family
    chip([0x1E, 0x94, 0x88], "ATmega16U4", 16 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA32U4)),
    chip([0x1E, 0x95, 0x87], "ATmega32U4", 32 * KB, 512, 128, HIGH, Some(&layouts::ATMEGA32U4)),
    // ATmega1284P family
    chip([0x1E, 0x97, 0x05], "ATmega1284P", 128 * KB, KB, 256, HIGH, Some(&layouts::ATMEGA164P)),
    // ATtiny4313 family
    chip([0x1E, 0x91, 0x0A], "ATtiny2313A", 2 * KB, 0, 32, None, Some(&layouts::ATTINY4313)),
    chip([0x1E, 0x92, 0x0D], "ATtiny4313", 4 * KB, 0, 64, None, Some(&layouts::ATTINY4313)),
    // ATtiny13 family
    chip([0x1E, 0x90, 0x07], "ATtiny13A", KB, 0, 32, None, Some(&layouts::ATTINY13)),
    // ATmega8A family
    timed(chip([0x1E, 0x93, 0x07], "ATmega8A", 8 * KB, 256, 64, HIGH, Some(&layouts::ATMEGA8))),
];

/// Look up a chip by device signature
///
/// Linear scan, first match wins.
pub fn find_by_signature(signature: [u8; 3]) -> Option<&'static ChipProfile> {
    find_in(CHIPS, signature)
}

/// Look up a chip in an arbitrary catalog
pub fn find_in(catalog: &[ChipProfile], signature: [u8; 3]) -> Option<&ChipProfile> {
    catalog.iter().find(|c| c.signature == signature)
}

/// Look up a chip by name (case-insensitive)
pub fn find_by_name(name: &str) -> Option<&'static ChipProfile> {
    CHIPS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
