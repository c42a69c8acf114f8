//! Multi-bit field interpreters

use core::fmt;

/// Label for bit patterns a table doesn't map
pub const RESERVED: &str = "reserved";

/// Decoder for a multi-bit fuse field
///
/// Each interpreter receives the field value already shifted down to bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpreter {
    /// Boot block size multiplier (x8, x4, x2, x1 of the base size)
    BootSize,
    /// Clock source, ATmega48/88/168/328 style
    ClockSource,
    /// Clock source, ATmega8 style
    ClockSourceAtmega8,
    /// SUT0/SUT1 start-up time bits
    StartUpTime,
    /// Brown-out detector level, two-bit table
    BrownOut,
    /// Brown-out detector level, ATmega8U2 table
    BrownOutAtmega8U2,
    /// Brown-out detector level, ATmega32U4 table
    BrownOutAtmega32U4,
    /// Lock bit mode
    LockBits,
    /// Boot loader section protection
    BootProtection,
    /// Application section protection
    AppProtection,
}

impl Interpreter {
    /// Heading shown in front of the decoded value
    pub const fn title(self) -> &'static str {
        match self {
            Interpreter::BootSize => "Bootloader size",
            Interpreter::ClockSource | Interpreter::ClockSourceAtmega8 => "Clock source",
            Interpreter::StartUpTime => "Start-up time",
            Interpreter::BrownOut
            | Interpreter::BrownOutAtmega8U2
            | Interpreter::BrownOutAtmega32U4 => "Brownout detection at",
            Interpreter::LockBits => "Lockbit mode",
            Interpreter::BootProtection => "Boot loader protection mode",
            Interpreter::AppProtection => "Application protection mode",
        }
    }

    /// Decode a normalized field value
    ///
    /// `base_boot_size` is only consulted by [`Interpreter::BootSize`],
    /// whose result saturates at `u32::MAX`.
    pub fn interpret(self, value: u8, base_boot_size: u32) -> FieldValue {
        match self {
            Interpreter::BootSize => {
                FieldValue::BootSize(base_boot_size.saturating_mul(boot_multiplier(value)))
            }
            Interpreter::StartUpTime => FieldValue::StartUp {
                sut0: value & 0b01 == 0,
                sut1: value & 0b10 == 0,
            },
            Interpreter::ClockSource => FieldValue::Text(clock_source(value)),
            Interpreter::ClockSourceAtmega8 => FieldValue::Text(clock_source_atmega8(value)),
            Interpreter::BrownOut => FieldValue::Text(brown_out(value & 0b11)),
            Interpreter::BrownOutAtmega8U2 => FieldValue::Text(brown_out_atmega8u2(value)),
            Interpreter::BrownOutAtmega32U4 => FieldValue::Text(brown_out_atmega32u4(value)),
            Interpreter::LockBits => FieldValue::Text(lock_bits(value & 0b11)),
            Interpreter::BootProtection => FieldValue::Text(boot_protection(value & 0b11)),
            Interpreter::AppProtection => FieldValue::Text(app_protection(value & 0b11)),
        }
    }
}

/// Boot block size multiplier for the two BOOTSZ bits
pub(crate) const fn boot_multiplier(value: u8) -> u32 {
    match value & 0b11 {
        0 => 8,
        1 => 4,
        2 => 2,
        _ => 1,
    }
}

fn clock_source(value: u8) -> &'static str {
    match value {
        0b1000..=0b1111 => "low-power crystal",
        0b0110..=0b0111 => "full-swing crystal",
        0b0100..=0b0101 => "low-frequency crystal",
        0b0011 => "internal 128 KHz oscillator",
        0b0010 => "calibrated internal oscillator",
        0b0000 => "external clock",
        _ => RESERVED,
    }
}

fn clock_source_atmega8(value: u8) -> &'static str {
    match value {
        0b1010..=0b1111 => "low-power crystal",
        0b1001 => "low-frequency crystal",
        0b0101..=0b1000 => "external RC oscillator",
        0b0001..=0b0100 => "calibrated internal oscillator",
        0b0000 => "external clock",
        _ => RESERVED,
    }
}

fn brown_out(value: u8) -> &'static str {
    match value {
        0b11 => "disabled",
        0b10 => "1.8V",
        0b01 => "2.7V",
        0b00 => "4.3V",
        _ => RESERVED,
    }
}

fn brown_out_atmega8u2(value: u8) -> &'static str {
    match value {
        0b111 => "disabled",
        0b110 => "2.7V",
        0b100 => "3.0V",
        0b011 => "3.5V",
        0b001 => "4.0V",
        0b000 => "4.3V",
        _ => RESERVED,
    }
}

fn brown_out_atmega32u4(value: u8) -> &'static str {
    match value {
        0b111 => "disabled",
        0b110 => "2.0V",
        0b101 => "2.2V",
        0b100 => "2.4V",
        0b011 => "2.6V",
        0b010 => "3.4V",
        0b001 => "3.5V",
        0b000 => "4.3V",
        _ => RESERVED,
    }
}

fn lock_bits(value: u8) -> &'static str {
    match value {
        0b00 => "3 - Further programming and verification disabled",
        0b01 => "undefined",
        0b10 => "2 - Further programming disabled",
        0b11 => "1 - No memory lock features enabled",
        _ => RESERVED,
    }
}

fn boot_protection(value: u8) -> &'static str {
    match value {
        0b00 => "3 - LPM and SPM prohibited in Boot Loader Section",
        0b01 => "4 - LPM prohibited in Boot Loader Section",
        0b10 => "2 - SPM prohibited in Boot Loader Section",
        0b11 => "1 - No lock on SPM and LPM in Boot Loader Section",
        _ => RESERVED,
    }
}

fn app_protection(value: u8) -> &'static str {
    match value {
        0b00 => "3 - LPM and SPM prohibited in Application Section",
        0b01 => "4 - LPM prohibited in Application Section",
        0b10 => "2 - SPM prohibited in Application Section",
        0b11 => "1 - No lock on SPM and LPM in Application Section",
        _ => RESERVED,
    }
}

/// Decoded value of one fuse field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// On/off field, `true` when programmed
    Flag(bool),
    /// Table lookup result, or [`RESERVED`]
    Text(&'static str),
    /// Boot block size in bytes
    BootSize(u32),
    /// Start-up time bits, `true` when programmed
    StartUp {
        /// SUT0 programmed
        sut0: bool,
        /// SUT1 programmed
        sut1: bool,
    },
    /// Raw bits of a field with no documented meaning
    Raw(u8),
}

impl FieldValue {
    /// Whether this is a table value the interpreter couldn't map
    pub fn is_reserved(&self) -> bool {
        matches!(self, FieldValue::Text(t) if *t == RESERVED)
    }
}

fn mark(set: bool) -> &'static str {
    if set {
        "[X]"
    } else {
        "[ ]"
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(set) => f.write_str(mark(*set)),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::BootSize(len) => write!(f, "{} bytes", len),
            FieldValue::StartUp { sut0, sut1 } => write!(
                f,
                "SUT0: {}  SUT1: {} (see datasheet)",
                mark(*sut0),
                mark(*sut1)
            ),
            FieldValue::Raw(bits) => write!(f, "0x{:02X}", bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_boot_size_multipliers() {
        let sizes: [FieldValue; 4] = [0, 1, 2, 3].map(|v| Interpreter::BootSize.interpret(v, 512));
        assert_eq!(
            sizes,
            [
                FieldValue::BootSize(4096),
                FieldValue::BootSize(2048),
                FieldValue::BootSize(1024),
                FieldValue::BootSize(512),
            ]
        );
    }

    #[test]
    fn test_boot_size_saturates() {
        assert_eq!(
            Interpreter::BootSize.interpret(0, u32::MAX / 2),
            FieldValue::BootSize(u32::MAX)
        );
        assert_eq!(
            Interpreter::BootSize.interpret(3, u32::MAX),
            FieldValue::BootSize(u32::MAX)
        );
    }

    #[test]
    fn test_clock_source_tables() {
        assert_eq!(
            Interpreter::ClockSource.interpret(0b1111, 0),
            FieldValue::Text("low-power crystal")
        );
        assert_eq!(
            Interpreter::ClockSource.interpret(0b0010, 0),
            FieldValue::Text("calibrated internal oscillator")
        );
        assert!(Interpreter::ClockSource.interpret(0b0001, 0).is_reserved());

        assert_eq!(
            Interpreter::ClockSourceAtmega8.interpret(0b1001, 0),
            FieldValue::Text("low-frequency crystal")
        );
        assert_eq!(
            Interpreter::ClockSourceAtmega8.interpret(0b0001, 0),
            FieldValue::Text("calibrated internal oscillator")
        );
    }

    #[test]
    fn test_brown_out_reserved_patterns() {
        assert!(Interpreter::BrownOutAtmega8U2.interpret(0b101, 0).is_reserved());
        assert!(Interpreter::BrownOutAtmega8U2.interpret(0b010, 0).is_reserved());
        assert_eq!(
            Interpreter::BrownOutAtmega32U4.interpret(0b010, 0),
            FieldValue::Text("3.4V")
        );
        // Two-bit table only looks at the low bits of a wider field
        assert_eq!(Interpreter::BrownOut.interpret(0b111, 0), FieldValue::Text("disabled"));
        assert_eq!(Interpreter::BrownOut.interpret(0b101, 0), FieldValue::Text("2.7V"));
    }

    #[test]
    fn test_brown_out_atmega8u2_table() {
        let expected = [
            (0b111, "disabled"),
            (0b110, "2.7V"),
            (0b101, RESERVED),
            (0b100, "3.0V"),
            (0b011, "3.5V"),
            (0b010, RESERVED),
            (0b001, "4.0V"),
            (0b000, "4.3V"),
        ];
        for (value, label) in expected {
            assert_eq!(
                Interpreter::BrownOutAtmega8U2.interpret(value, 0),
                FieldValue::Text(label),
                "BODLEVEL {:03b}",
                value
            );
        }
    }

    #[test]
    fn test_protection_tables() {
        let app = [
            (0b00, "3 - LPM and SPM prohibited in Application Section"),
            (0b01, "4 - LPM prohibited in Application Section"),
            (0b10, "2 - SPM prohibited in Application Section"),
            (0b11, "1 - No lock on SPM and LPM in Application Section"),
        ];
        for (value, label) in app {
            assert_eq!(Interpreter::AppProtection.interpret(value, 0), FieldValue::Text(label));
        }

        let boot = [
            (0b00, "3 - LPM and SPM prohibited in Boot Loader Section"),
            (0b01, "4 - LPM prohibited in Boot Loader Section"),
            (0b10, "2 - SPM prohibited in Boot Loader Section"),
            (0b11, "1 - No lock on SPM and LPM in Boot Loader Section"),
        ];
        for (value, label) in boot {
            assert_eq!(Interpreter::BootProtection.interpret(value, 0), FieldValue::Text(label));
        }
    }

    #[test]
    fn test_start_up_bits_are_independent() {
        assert_eq!(
            Interpreter::StartUpTime.interpret(0b10, 0),
            FieldValue::StartUp {
                sut0: true,
                sut1: false
            }
        );
        assert_eq!(
            Interpreter::StartUpTime.interpret(0b01, 0).to_string(),
            "SUT0: [ ]  SUT1: [X] (see datasheet)"
        );
    }

    #[test]
    fn test_lock_mode_undefined() {
        assert_eq!(Interpreter::LockBits.interpret(0b01, 0), FieldValue::Text("undefined"));
        assert!(!Interpreter::LockBits.interpret(0b01, 0).is_reserved());
    }

    #[test]
    fn test_every_value_has_a_label() {
        let all = [
            Interpreter::ClockSource,
            Interpreter::ClockSourceAtmega8,
            Interpreter::BrownOut,
            Interpreter::BrownOutAtmega8U2,
            Interpreter::BrownOutAtmega32U4,
            Interpreter::LockBits,
            Interpreter::BootProtection,
            Interpreter::AppProtection,
        ];
        for interp in all {
            for v in 0..=u8::MAX {
                match interp.interpret(v, 0) {
                    FieldValue::Text(t) => assert!(!t.is_empty()),
                    other => panic!("{:?} produced {:?}", interp, other),
                }
            }
        }
    }
}
