//! ispdetect-dummy - Emulated AVR target for testing
//!
//! This crate provides a dummy ISP programmer with an AVR target behind it,
//! emulated in memory. It answers the serial programming instruction set
//! like a real part does, so the whole detection flow can be exercised
//! without hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use ispdetect_core::chip::ChipProfile;
use ispdetect_core::error::{Error, Result};
use ispdetect_core::fuse::RawFuseBytes;
use ispdetect_core::isp::opcodes;
use ispdetect_core::programmer::IspMaster;

/// Configuration for the emulated target
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Device signature
    pub signature: [u8; 3],
    /// Fuse, lock and calibration bytes
    pub fuses: RawFuseBytes,
    /// Program memory size in bytes
    pub flash_size: u32,
    /// Programming Enable is acknowledged from this attempt on,
    /// `None` never acknowledges
    pub sync_after: Option<u8>,
    /// Reported bus clock period in nanoseconds
    pub clock_period_ns: u64,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            signature: [0x1E, 0x95, 0x0F], // ATmega328P
            fuses: RawFuseBytes::new(0xFF, 0xDE, 0xFD, 0xCF, 0x9A), // Arduino Uno
            flash_size: 32 * 1024,
            sync_after: Some(1),
            clock_period_ns: 8_000, // 125 kHz
        }
    }
}

impl DummyConfig {
    /// Emulate a catalogued chip with all fuses unprogrammed
    pub fn for_chip(profile: &ChipProfile) -> Self {
        Self {
            signature: profile.signature,
            fuses: RawFuseBytes::default(),
            flash_size: profile.flash_size,
            ..Self::default()
        }
    }

    /// Use these fuse bytes
    pub fn with_fuses(mut self, fuses: RawFuseBytes) -> Self {
        self.fuses = fuses;
        self
    }

    /// Acknowledge Programming Enable from this attempt on
    pub fn with_sync_after(mut self, sync_after: Option<u8>) -> Self {
        self.sync_after = sync_after;
        self
    }
}

/// Bus activity seen by the emulated target
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default)]
pub struct DummyStats {
    /// Every complete 4-byte frame, in order
    pub frames: Vec<[u8; 4]>,
    /// Programming Enable frames received
    pub sync_attempts: u8,
    /// Load Extended Address frames received
    pub extended_loads: u32,
    /// Times the target was put into reset
    pub reset_pulses: u32,
    /// Sum of all requested delays
    pub delayed_us: u64,
    /// Sessions begun
    pub sessions: u32,
}

/// Dummy ISP programmer
///
/// Emulates an AVR target in memory for testing purposes.
#[cfg(feature = "alloc")]
pub struct DummyTarget {
    config: DummyConfig,
    flash: Vec<u8>,
    stats: DummyStats,
    frame: [u8; 4],
    pos: usize,
    bus_held: bool,
    reset_active: bool,
    programming: bool,
    extended: u8,
}

#[cfg(feature = "alloc")]
impl DummyTarget {
    /// Create a new target with erased program memory
    pub fn new(config: DummyConfig) -> Self {
        let flash = vec![opcodes::ERASED; config.flash_size as usize];
        Self {
            config,
            flash,
            stats: DummyStats::default(),
            frame: [0; 4],
            pos: 0,
            bus_held: false,
            reset_active: false,
            programming: false,
            extended: 0,
        }
    }

    /// Create a new target with the default configuration (Arduino Uno)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get program memory contents
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// Get mutable access to program memory
    pub fn flash_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// Bus activity so far
    pub fn stats(&self) -> &DummyStats {
        &self.stats
    }

    /// Whether the target is held in reset
    pub fn in_reset(&self) -> bool {
        self.reset_active
    }

    /// Whether the target accepted Programming Enable and is still in reset
    pub fn in_programming_mode(&self) -> bool {
        self.programming
    }

    /// Copy an image into program memory at `address`
    pub fn load_image(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let start = address as usize;
        let end = start
            .checked_add(data.len())
            .filter(|&end| end <= self.flash.len())
            .ok_or(Error::AddressOutOfBounds)?;
        self.flash[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Copy an image so that it ends at the top of program memory
    ///
    /// This is where a bootloader lives.
    pub fn load_boot_image(&mut self, data: &[u8]) -> Result<()> {
        let address = self
            .flash
            .len()
            .checked_sub(data.len())
            .ok_or(Error::AddressOutOfBounds)?;
        self.load_image(address as u32, data)
    }

    fn result_byte(&mut self) -> u8 {
        let [b1, b2, b3, _] = self.frame;
        if !self.programming {
            return 0x00;
        }
        let fuses = self.config.fuses;
        match (b1, b2) {
            (opcodes::READ_SIGNATURE, _) => {
                self.config.signature.get(b3 as usize).copied().unwrap_or(0xFF)
            }
            (opcodes::READ_LOW_FUSE, opcodes::READ_LOW_FUSE_ARG) => fuses.low,
            (opcodes::READ_HIGH_FUSE, opcodes::READ_HIGH_FUSE_ARG) => fuses.high,
            (opcodes::READ_EXT_FUSE, opcodes::READ_EXT_FUSE_ARG) => fuses.extended,
            (opcodes::READ_LOCK, opcodes::READ_LOCK_ARG) => fuses.lock,
            (opcodes::READ_CALIBRATION, _) => fuses.calibration,
            (opcodes::LOAD_EXTENDED_ADDRESS, _) => {
                self.extended = b3;
                self.stats.extended_loads += 1;
                0x00
            }
            (op, hi) if op & !opcodes::READ_HIGH_BYTE == opcodes::READ_PROGRAM_MEMORY => {
                let word = (u32::from(self.extended) << 16) | (u32::from(hi) << 8) | u32::from(b3);
                let high = u32::from(op & opcodes::READ_HIGH_BYTE != 0);
                // Real parts wrap addresses past the end of their memory
                let len = self.flash.len().max(1);
                self.flash
                    .get((word * 2 + high) as usize % len)
                    .copied()
                    .unwrap_or(opcodes::ERASED)
            }
            _ => 0x00,
        }
    }
}

#[cfg(feature = "alloc")]
impl IspMaster for DummyTarget {
    fn begin_session(&mut self) -> Result<()> {
        log::debug!("dummy: bus acquired");
        self.bus_held = true;
        self.stats.sessions += 1;
        self.pos = 0;
        Ok(())
    }

    fn end_session(&mut self) {
        if self.bus_held {
            log::debug!("dummy: bus released");
        }
        self.bus_held = false;
        self.reset_active = false;
        self.programming = false;
        self.extended = 0;
    }

    fn transfer(&mut self, byte: u8) -> Result<u8> {
        if !self.bus_held {
            return Err(Error::ProgrammerError);
        }
        // With RESET released the target runs and MISO floats high
        if !self.reset_active {
            return Ok(0xFF);
        }

        self.frame[self.pos] = byte;
        let reply = match self.pos {
            2 if self.frame[0] == opcodes::PROGRAM_ENABLE => {
                self.stats.sync_attempts = self.stats.sync_attempts.saturating_add(1);
                let acked = self
                    .config
                    .sync_after
                    .is_some_and(|n| self.stats.sync_attempts >= n);
                if acked {
                    self.programming = true;
                    self.frame[1]
                } else {
                    0x00
                }
            }
            3 => self.result_byte(),
            // The target echoes the previous byte once in programming mode
            p if p > 0 && self.programming => self.frame[p - 1],
            _ => 0x00,
        };

        self.pos += 1;
        if self.pos == 4 {
            self.stats.frames.push(self.frame);
            self.pos = 0;
        }
        Ok(reply)
    }

    fn set_reset(&mut self, active: bool) -> Result<()> {
        if !self.bus_held {
            return Err(Error::ProgrammerError);
        }
        if active && !self.reset_active {
            self.stats.reset_pulses += 1;
        }
        if !active {
            // Leaving reset ends programming mode and clears the
            // extended address register
            self.programming = false;
            self.extended = 0;
            self.pos = 0;
        }
        self.reset_active = active;
        Ok(())
    }

    fn clock_period_ns(&self) -> u64 {
        self.config.clock_period_ns
    }

    fn delay_us(&mut self, us: u32) {
        self.stats.delayed_us += u64::from(us);
    }
}

/// Errors building a dummy target from options
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum DummyError {
    /// No catalogued chip has this name
    #[error("unknown chip '{0}'")]
    UnknownChip(String),

    /// An option value could not be parsed
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The image does not fit into program memory
    #[error("image of {len} bytes does not fit into {flash_size} bytes of program memory")]
    ImageTooLarge {
        /// Image length
        len: usize,
        /// Program memory size
        flash_size: u32,
    },

    /// An image file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the image file
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(feature = "std")]
fn parse_byte(key: &str, value: &str) -> std::result::Result<u8, DummyError> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| DummyError::InvalidParameter(format!("{}={}", key, value)))
}

#[cfg(feature = "std")]
fn read_image(path: &str) -> std::result::Result<Vec<u8>, DummyError> {
    std::fs::read(path).map_err(|source| DummyError::Io {
        path: path.to_string(),
        source,
    })
}

/// Parse programmer options into a dummy target
///
/// Supported options:
/// - `chip=<name>`: emulate a catalogued chip (default ATmega328P with Uno fuses)
/// - `lfuse=`, `hfuse=`, `efuse=`, `lock=`: override a fuse byte (decimal or `0x` hex)
/// - `image=<path>`: load a file at address 0
/// - `bootloader=<path>`: load a file at the top of program memory
/// - `sync_after=<n>`: acknowledge Programming Enable from attempt `n` on
/// - `nosync`: never acknowledge Programming Enable
#[cfg(feature = "std")]
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<DummyTarget, DummyError> {
    let mut config = DummyConfig::default();
    for (key, value) in options {
        if *key == "chip" {
            let profile = ispdetect_core::chip::find_by_name(value)
                .ok_or_else(|| DummyError::UnknownChip(value.to_string()))?;
            config = DummyConfig::for_chip(profile);
        }
    }

    for (key, value) in options {
        match *key {
            "lfuse" => config.fuses.low = parse_byte(key, value)?,
            "hfuse" => config.fuses.high = parse_byte(key, value)?,
            "efuse" => config.fuses.extended = parse_byte(key, value)?,
            "lock" => config.fuses.lock = parse_byte(key, value)?,
            "sync_after" => {
                let n = parse_byte(key, value)?;
                if n == 0 {
                    return Err(DummyError::InvalidParameter(
                        "sync_after must be at least 1".into(),
                    ));
                }
                config.sync_after = Some(n);
            }
            "nosync" => config.sync_after = None,
            "chip" | "image" | "bootloader" => {}
            other => {
                log::warn!("dummy: ignoring unknown option '{}'", other);
            }
        }
    }

    let mut target = DummyTarget::new(config);
    let flash_size = target.config.flash_size;
    for (key, value) in options {
        let placed = match *key {
            "image" => {
                let data = read_image(value)?;
                target.load_image(0, &data).map_err(|_| data.len())
            }
            "bootloader" => {
                let data = read_image(value)?;
                target.load_boot_image(&data).map_err(|_| data.len())
            }
            _ => continue,
        };
        placed.map_err(|len| DummyError::ImageTooLarge { len, flash_size })?;
    }
    Ok(target)
}

/// Open a dummy target from programmer options
#[cfg(feature = "std")]
pub fn open_dummy(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn IspMaster>, Box<dyn std::error::Error>> {
    let target = parse_options(options)?;
    log::info!(
        "dummy: emulating signature {:02X} {:02X} {:02X}",
        target.config.signature[0],
        target.config.signature[1],
        target.config.signature[2]
    );
    Ok(Box::new(target))
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use ispdetect_core::bootloader::{
        self, BootRegion, BootloaderOutcome, Fingerprint, KnownImage, NoProgress, KNOWN_IMAGES,
    };
    use ispdetect_core::chip::{self, CHIPS};
    use ispdetect_core::detect::{self, DetectOptions};
    use ispdetect_core::isp::{IspSession, SessionState};
    use ispdetect_core::memory::MemoryReader;
    use ispdetect_core::{context, fuse, protocol};

    fn ready(target: DummyTarget) -> IspSession<DummyTarget> {
        let mut session = IspSession::new(target);
        session.establish().unwrap();
        session
    }

    #[test]
    fn test_never_syncs() {
        let config = DummyConfig::default().with_sync_after(None);
        let mut session = IspSession::new(DummyTarget::new(config));

        let err = session.establish().unwrap_err();
        assert_eq!(err, Error::ProgrammingModeFailed { attempts: 10 });
        assert_eq!(session.state(), SessionState::Failed);

        let target = session.master();
        assert_eq!(target.stats().sync_attempts, 10);
        assert!(target.stats().frames.iter().all(|f| f[0] == opcodes::PROGRAM_ENABLE));

        session.teardown();
        assert!(!session.master().in_reset());
    }

    #[test]
    fn test_syncs_on_third_attempt() {
        let config = DummyConfig::default().with_sync_after(Some(3));
        let session = ready(DummyTarget::new(config));
        assert_eq!(session.attempts(), 3);
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.master().in_programming_mode());
    }

    #[test]
    fn test_transfer_without_bus_fails() {
        let mut target = DummyTarget::new_default();
        assert_eq!(target.transfer(0xAC), Err(Error::ProgrammerError));
    }

    #[test]
    fn test_identify_uno() {
        let mut session = ready(DummyTarget::new_default());
        let (_, profile) = protocol::identify(&mut session, CHIPS).unwrap();
        assert_eq!(profile.unwrap().name, "ATmega328P");
    }

    #[test]
    fn test_unknown_signature() {
        let config = DummyConfig {
            signature: [0x1E, 0x95, 0x10],
            ..DummyConfig::default()
        };
        let mut session = ready(DummyTarget::new(config));

        let target = context::probe(&mut session, CHIPS).unwrap();
        assert!(!target.is_known());
        assert_eq!(target.name(), "unknown");
        assert_eq!(target.signature.to_string(), "1E 95 10");
        assert!(target.decode_fuses().is_none());
    }

    #[test]
    fn test_uno_fuses_decode() {
        let mut session = ready(DummyTarget::new_default());
        let profile = chip::find_by_name("ATmega328P").unwrap();
        let fuses = protocol::read_fuses(&mut session).unwrap();
        assert_eq!(fuses, RawFuseBytes::new(0xFF, 0xDE, 0xFD, 0xCF, 0x9A));

        let fields: Vec<_> = fuse::decode(profile, &fuses).unwrap().collect();
        let reset = fields.iter().find(|f| f.label == "Boot into bootloader").unwrap();
        assert_eq!(reset.value.to_string(), "[X]");
        let spien = fields.iter().find(|f| f.label == "Enable Serial (ICSP) Programming").unwrap();
        assert_eq!(spien.value.to_string(), "[X]");
        let ckdiv = fields.iter().find(|f| f.label == "Divide clock by 8").unwrap();
        assert_eq!(ckdiv.value.to_string(), "[ ]");
    }

    #[test]
    fn test_uno_boot_region() {
        let profile = chip::find_by_name("ATmega328P").unwrap();
        let region = bootloader::boot_region(profile, &DummyConfig::default().fuses);
        assert_eq!(region, Some(BootRegion { start: 32256, len: 512 }));
    }

    #[test]
    fn test_bootloader_erased() {
        let mut session = ready(DummyTarget::new_default());
        let profile = chip::find_by_name("ATmega328P").unwrap();
        let fuses = protocol::read_fuses(&mut session).unwrap();
        let report =
            bootloader::identify(&mut session, profile, &fuses, KNOWN_IMAGES, &mut NoProgress)
                .unwrap();
        assert_eq!(report.outcome, BootloaderOutcome::AllErased);
    }

    #[test]
    fn test_bootloader_identified_and_unknown() {
        let image: Vec<u8> = (0..512u32).map(|i| (i ^ 0x5A) as u8).collect();
        let catalog = [KnownImage {
            fingerprint: Fingerprint::of(&image),
            name: "Test loader 512 bytes",
        }];

        let mut target = DummyTarget::new_default();
        target.load_boot_image(&image).unwrap();
        let mut session = ready(target);
        let profile = chip::find_by_name("ATmega328P").unwrap();
        let fuses = protocol::read_fuses(&mut session).unwrap();

        let report =
            bootloader::identify(&mut session, profile, &fuses, &catalog[..], &mut NoProgress)
                .unwrap();
        assert_eq!(report.outcome, BootloaderOutcome::Identified("Test loader 512 bytes"));

        let report =
            bootloader::identify(&mut session, profile, &fuses, KNOWN_IMAGES, &mut NoProgress)
                .unwrap();
        assert_eq!(report.outcome, BootloaderOutcome::Unknown);
    }

    #[test]
    fn test_no_boot_block_reads_nothing() {
        let profile = chip::find_by_name("ATtiny85").unwrap();
        let mut session = ready(DummyTarget::new(DummyConfig::for_chip(profile)));
        let frames_before = session.master().stats().frames.len();

        let report = bootloader::identify(
            &mut session,
            profile,
            &RawFuseBytes::default(),
            KNOWN_IMAGES,
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(report.outcome, BootloaderOutcome::NotSupported);
        assert_eq!(session.master().stats().frames.len(), frames_before);
    }

    #[test]
    fn test_atmega2560_full_scan_reloads_once() {
        let profile = chip::find_by_name("ATmega2560").unwrap();
        let mut target = DummyTarget::new(DummyConfig::for_chip(profile));
        target.flash_mut()[0x1FFFF] = 0x11;
        target.flash_mut()[0x20000] = 0x22;
        let mut session = ready(target);

        let mut reader = MemoryReader::for_chip(&mut session, profile);
        let mut seen = (0, 0);
        for addr in 0..profile.flash_size {
            let byte = reader.read_byte(addr).unwrap();
            match addr {
                0x1FFFF => seen.0 = byte,
                0x20000 => seen.1 = byte,
                _ => {}
            }
        }
        assert_eq!(reader.extended_reloads(), 1);
        assert_eq!(seen, (0x11, 0x22));
        assert_eq!(session.master().stats().extended_loads, 1);
    }

    #[test]
    fn test_detect_run_end_to_end() {
        let mut target = DummyTarget::new_default();
        target.load_image(0, &[0x0C, 0x94, 0x5C, 0x00]).unwrap();
        let mut session = IspSession::new(target);

        let report = detect::run(
            &mut session,
            CHIPS,
            KNOWN_IMAGES,
            &DetectOptions::default(),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(report.target.name(), "ATmega328P");
        assert!(report.has_fuse_info());
        assert_eq!(report.bootloader.unwrap().outcome, BootloaderOutcome::AllErased);
        assert_eq!(&report.program_head[..4], &[0x0C, 0x94, 0x5C, 0x00]);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.master().in_reset());
    }

    #[test]
    fn test_parse_options() {
        let target = parse_options(&[("chip", "attiny85"), ("lfuse", "0x62"), ("nosync", "")]).unwrap();
        assert_eq!(target.config().signature, [0x1E, 0x93, 0x0B]);
        assert_eq!(target.config().fuses.low, 0x62);
        assert_eq!(target.config().sync_after, None);
        assert_eq!(target.flash().len(), 8 * 1024);

        let target = parse_options(&[("sync_after", "4")]).unwrap();
        assert_eq!(target.config().sync_after, Some(4));
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(matches!(
            parse_options(&[("chip", "atmega9000")]),
            Err(DummyError::UnknownChip(_))
        ));
        assert!(matches!(
            parse_options(&[("hfuse", "0x1FF")]),
            Err(DummyError::InvalidParameter(_))
        ));
        assert!(matches!(
            parse_options(&[("sync_after", "0")]),
            Err(DummyError::InvalidParameter(_))
        ));
        assert!(matches!(
            parse_options(&[("image", "/nonexistent/ispdetect-image.bin")]),
            Err(DummyError::Io { .. })
        ));
    }

    #[test]
    fn test_load_image_bounds() {
        let mut target = DummyTarget::new_default();
        assert_eq!(target.load_image(32760, &[0; 16]), Err(Error::AddressOutOfBounds));
        assert_eq!(target.load_boot_image(&vec![0; 40000]), Err(Error::AddressOutOfBounds));
        assert!(target.load_boot_image(&[0xAA; 512]).is_ok());
        assert_eq!(target.flash()[32256], 0xAA);
    }
}
