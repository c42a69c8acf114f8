//! Chip profile type definitions

use core::fmt;

use crate::fuse::{FuseByte, FuseLayout};

/// Three-byte device signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 3]);

impl Signature {
    /// Whether the bytes look like a real Atmel/Microchip part
    ///
    /// An unconnected or unpowered target reads back as all-ones or
    /// all-zeros.
    pub fn is_plausible(&self) -> bool {
        self.0 != [0xFF; 3] && self.0 != [0x00; 3]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X} {:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl From<[u8; 3]> for Signature {
    fn from(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }
}

/// Static description of one AVR variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipProfile {
    /// Device signature, unique across the catalog
    pub signature: [u8; 3],
    /// Part name
    pub name: &'static str,
    /// Program memory size in bytes
    pub flash_size: u32,
    /// Smallest boot block size in bytes (0 if the part has no boot block)
    pub base_boot_size: u32,
    /// Flash page size in bytes
    pub page_size: u32,
    /// Fuse byte carrying the BOOTSZ bits
    pub boot_size_fuse: Option<FuseByte>,
    /// Fuse field table
    pub fuse_layout: Option<&'static FuseLayout>,
    /// Writes must be timed because the part can't be polled
    pub timed_writes: bool,
}

impl ChipProfile {
    /// Signature as a [`Signature`]
    pub fn signature(&self) -> Signature {
        Signature(self.signature)
    }

    /// Whether the part supports a boot loader section
    pub fn has_boot_section(&self) -> bool {
        self.base_boot_size > 0
    }
}

impl fmt::Display for ChipProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
