//! Fuse field tables
//!
//! Each table is shared by every chip in its family. Entries are listed in
//! display order: single-bit features first, then the multi-bit fields.

use crate::fuse::FuseByte::{Extended, High, Lock, Low};
use crate::fuse::{FuseFieldDescriptor as F, FuseLayout, Interpreter as I};

const EXTERNAL_RESET_DISABLE: &str = "External Reset Disable";
const DEBUG_WIRE_ENABLE: &str = "Debug Wire Enable";
const SERIAL_PROGRAMMING_ENABLE: &str = "Enable Serial (ICSP) Programming";
const WATCHDOG_ALWAYS_ON: &str = "Watchdog Timer Always On";
const EEPROM_SAVE: &str = "Preserve EEPROM through chip erase";
const BOOT_INTO_BOOTLOADER: &str = "Boot into bootloader";
const DIVIDE_CLOCK_BY_8: &str = "Divide clock by 8";
const CLOCK_OUTPUT: &str = "Clock output";
const SELF_PROGRAMMING_ENABLE: &str = "Self Programming Enable";
const HARDWARE_BOOT_ENABLE: &str = "Hardware Boot Enable";
const OCD_ENABLE: &str = "OCD Enable";
const JTAG_ENABLE: &str = "JTAG Enable";
const OSCILLATOR_OPTIONS: &str = "Oscillator Options";
const BROWN_OUT_ENABLE: &str = "Brown out detector enable";
const BROWN_OUT_LEVEL: &str = "Brown out detector level";

/// ATmega48PA, also ATtiny25/45/85
pub static ATMEGA48PA: FuseLayout = FuseLayout {
    name: "ATmega48PA",
    fields: &[
        F::flag(Extended, 0x01, SELF_PROGRAMMING_ENABLE),
        F::flag(High, 0x80, EXTERNAL_RESET_DISABLE),
        F::flag(High, 0x40, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(High, 0x07, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
    ],
};

/// ATmega88PA and ATmega168PA
pub static ATMEGA88PA: FuseLayout = FuseLayout {
    name: "ATmega88PA",
    fields: &[
        F::flag(High, 0x80, EXTERNAL_RESET_DISABLE),
        F::flag(High, 0x40, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::flag(Extended, 0x01, BOOT_INTO_BOOTLOADER),
        F::special(Extended, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(High, 0x07, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// ATmega328P
pub static ATMEGA328P: FuseLayout = FuseLayout {
    name: "ATmega328P",
    fields: &[
        F::flag(High, 0x80, EXTERNAL_RESET_DISABLE),
        F::flag(High, 0x40, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(High, 0x01, BOOT_INTO_BOOTLOADER),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(High, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(Extended, 0x07, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// ATmega8U2/16U2/32U2 and AT90USB82/162
pub static ATMEGA8U2: FuseLayout = FuseLayout {
    name: "ATmega8U2",
    fields: &[
        F::flag(Extended, 0x08, HARDWARE_BOOT_ENABLE),
        F::flag(High, 0x80, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x40, EXTERNAL_RESET_DISABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(High, 0x01, BOOT_INTO_BOOTLOADER),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(High, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(Extended, 0x07, I::BrownOutAtmega8U2),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// ATmega16U4 and ATmega32U4
pub static ATMEGA32U4: FuseLayout = FuseLayout {
    name: "ATmega32U4",
    fields: &[
        F::flag(Extended, 0x08, HARDWARE_BOOT_ENABLE),
        F::flag(High, 0x80, OCD_ENABLE),
        F::flag(High, 0x40, JTAG_ENABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(High, 0x01, BOOT_INTO_BOOTLOADER),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(High, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(Extended, 0x07, I::BrownOutAtmega32U4),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// ATmega164P family, also the ATmega640/1280/2560 and ATmega1284P parts
pub static ATMEGA164P: FuseLayout = FuseLayout {
    name: "ATmega164P",
    fields: &[
        F::flag(High, 0x80, OCD_ENABLE),
        F::flag(High, 0x40, JTAG_ENABLE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x08, EEPROM_SAVE),
        F::flag(High, 0x01, BOOT_INTO_BOOTLOADER),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(High, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(Extended, 0x07, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// ATtiny2313A and ATtiny4313
pub static ATTINY4313: FuseLayout = FuseLayout {
    name: "ATtiny4313",
    fields: &[
        F::flag(Extended, 0x01, SELF_PROGRAMMING_ENABLE),
        F::flag(High, 0x80, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x40, EEPROM_SAVE),
        F::flag(High, 0x20, SERIAL_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x01, EXTERNAL_RESET_DISABLE),
        F::flag(Low, 0x80, DIVIDE_CLOCK_BY_8),
        F::flag(Low, 0x40, CLOCK_OUTPUT),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSource),
        F::special(High, 0x0E, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
    ],
};

/// ATtiny13A
pub static ATTINY13: FuseLayout = FuseLayout {
    name: "ATtiny13",
    fields: &[
        F::flag(High, 0x10, SELF_PROGRAMMING_ENABLE),
        F::flag(High, 0x08, DEBUG_WIRE_ENABLE),
        F::flag(High, 0x01, EXTERNAL_RESET_DISABLE),
        F::flag(Low, 0x80, SERIAL_PROGRAMMING_ENABLE),
        F::flag(Low, 0x40, EEPROM_SAVE),
        F::flag(Low, 0x20, WATCHDOG_ALWAYS_ON),
        F::flag(Low, 0x10, DIVIDE_CLOCK_BY_8),
        F::special(Low, 0x0C, I::StartUpTime),
        F::special(Low, 0x03, I::ClockSource),
        F::special(High, 0x06, I::BrownOut),
        F::special(Lock, 0x03, I::LockBits),
    ],
};

/// ATmega8A
///
/// The EEPROM save entry shares mask `0x80` with External Reset Disable,
/// exactly as catalogued.
pub static ATMEGA8: FuseLayout = FuseLayout {
    name: "ATmega8",
    fields: &[
        F::flag(High, 0x80, EXTERNAL_RESET_DISABLE),
        F::flag(High, 0x40, WATCHDOG_ALWAYS_ON),
        F::flag(High, 0x20, SELF_PROGRAMMING_ENABLE),
        F::flag(High, 0x10, OSCILLATOR_OPTIONS),
        F::flag(High, 0x80, EEPROM_SAVE),
        F::flag(High, 0x01, BOOT_INTO_BOOTLOADER),
        F::flag(Low, 0x80, BROWN_OUT_LEVEL),
        F::flag(Low, 0x40, BROWN_OUT_ENABLE),
        F::special(High, 0x06, I::BootSize),
        F::special(Low, 0x30, I::StartUpTime),
        F::special(Low, 0x0F, I::ClockSourceAtmega8),
        F::special(Lock, 0x03, I::LockBits),
        F::special(Lock, 0x0C, I::AppProtection),
        F::special(Lock, 0x30, I::BootProtection),
    ],
};

/// Every layout, for listing
pub static ALL: &[&FuseLayout] = &[
    &ATMEGA48PA,
    &ATMEGA88PA,
    &ATMEGA328P,
    &ATMEGA8U2,
    &ATMEGA32U4,
    &ATMEGA164P,
    &ATTINY4313,
    &ATTINY13,
    &ATMEGA8,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuse::FieldMeaning;

    #[test]
    fn test_masks_are_nonzero() {
        for layout in ALL {
            for field in layout.fields {
                assert_ne!(field.mask, 0, "{}: {:?}", layout.name, field);
            }
        }
    }

    #[test]
    fn test_atmega8_shares_mask() {
        let shared: usize = ATMEGA8
            .fields
            .iter()
            .filter(|f| f.byte == High && f.mask == 0x80)
            .count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn test_boot_size_fields() {
        let boot_fields = |layout: &FuseLayout| {
            layout
                .fields
                .iter()
                .filter(|f| f.meaning == FieldMeaning::Special(I::BootSize))
                .count()
        };
        assert_eq!(boot_fields(&ATMEGA48PA), 0);
        assert_eq!(boot_fields(&ATMEGA88PA), 1);
        assert_eq!(boot_fields(&ATMEGA328P), 1);
        assert_eq!(boot_fields(&ATTINY13), 0);
    }
}
