//! Boot block location and identification

use core::fmt;

use super::fingerprint::{Fingerprint, RegionHasher};
use super::known::KnownImage;
use crate::chip::ChipProfile;
use crate::error::Result;
use crate::fuse::{boot_multiplier, RawFuseBytes};
use crate::isp::IspSession;
use crate::memory::MemoryReader;
use crate::programmer::IspMaster;

/// How often the scan reports progress, in bytes
const PROGRESS_STEP: u32 = 64;

/// A set of known images searchable by fingerprint
pub trait ImageCatalog {
    /// Name of the first image with this fingerprint
    fn find(&self, fingerprint: &Fingerprint) -> Option<&str>;
}

impl ImageCatalog for [KnownImage] {
    fn find(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.iter()
            .find(|img| img.fingerprint == *fingerprint)
            .map(|img| img.name)
    }
}

/// Progress callback for boot block scans
pub trait ScanProgress {
    /// Called once before the first byte is read
    fn scanning(&mut self, region: &BootRegion);

    /// Called periodically with the number of bytes read so far
    fn scan_progress(&mut self, bytes_read: u32);

    /// Called once after the last byte
    fn complete(&mut self);
}

/// A no-op progress reporter
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn scanning(&mut self, _region: &BootRegion) {}
    fn scan_progress(&mut self, _bytes_read: u32) {}
    fn complete(&mut self) {}
}

/// Location of the boot block in program memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootRegion {
    /// First byte address
    pub start: u32,
    /// Length in bytes
    pub len: u32,
}

impl BootRegion {
    /// One past the last byte address
    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

impl fmt::Display for BootRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes starting at 0x{:X}", self.len, self.start)
    }
}

/// Result of identifying the boot block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootloaderOutcome<'a> {
    /// The chip has no boot block, nothing was read
    NotSupported,
    /// Every byte reads as `0xFF`
    AllErased,
    /// The digest matched a known image
    Identified(&'a str),
    /// The digest matched nothing
    Unknown,
}

impl fmt::Display for BootloaderOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "no bootloader support"),
            Self::AllErased => write!(f, "no bootloader (all 0xFF)"),
            Self::Identified(name) => write!(f, "{}", name),
            Self::Unknown => write!(f, "bootloader MD5 sum not known"),
        }
    }
}

/// Outcome of a boot block scan with the region and digest it covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootloaderReport<'a> {
    /// What the boot block holds
    pub outcome: BootloaderOutcome<'a>,
    /// Region scanned, `None` if unsupported
    pub region: Option<BootRegion>,
    /// Digest of the region, `None` if unsupported
    pub digest: Option<Fingerprint>,
}

impl BootloaderReport<'_> {
    /// Report for a chip without a boot block
    pub const fn not_supported() -> Self {
        Self {
            outcome: BootloaderOutcome::NotSupported,
            region: None,
            digest: None,
        }
    }
}

/// Compute the boot block region for a chip
///
/// The two BOOTSZ bits sit at bits 1..2 of the profile's boot size fuse
/// and select a multiplier of the base size. Returns `None` for parts
/// without a boot block or without a boot size fuse.
pub fn boot_region(profile: &ChipProfile, fuses: &RawFuseBytes) -> Option<BootRegion> {
    if profile.base_boot_size == 0 {
        return None;
    }
    let fuse = fuses.get(profile.boot_size_fuse?);
    let len = profile
        .base_boot_size
        .saturating_mul(boot_multiplier((fuse >> 1) & 0b11));
    Some(BootRegion {
        start: profile.flash_size.saturating_sub(len),
        len,
    })
}

/// Stream a region through the digest and match it against a catalog
///
/// `on_byte` sees every byte with its address, in ascending order.
pub fn identify_region<'c, M, C, P, F>(
    reader: &mut MemoryReader<'_, M>,
    region: BootRegion,
    catalog: &'c C,
    progress: &mut P,
    mut on_byte: F,
) -> Result<(BootloaderOutcome<'c>, Fingerprint)>
where
    M: IspMaster,
    C: ImageCatalog + ?Sized,
    P: ScanProgress + ?Sized,
    F: FnMut(u32, u8),
{
    log::debug!("bootloader: scanning {}", region);
    progress.scanning(&region);

    let mut hasher = RegionHasher::new();
    for addr in region.start..region.end() {
        let byte = reader.read_byte(addr)?;
        hasher.update(byte);
        on_byte(addr, byte);

        if hasher.len() % PROGRESS_STEP == 0 {
            progress.scan_progress(hasher.len());
        }
    }
    progress.scan_progress(hasher.len());
    progress.complete();

    let (digest, all_erased) = hasher.finish();
    let outcome = if all_erased {
        BootloaderOutcome::AllErased
    } else {
        match catalog.find(&digest) {
            Some(name) => BootloaderOutcome::Identified(name),
            None => {
                log::warn!("bootloader: MD5 {} not in catalog", digest);
                BootloaderOutcome::Unknown
            }
        }
    };

    log::debug!("bootloader: MD5 {} -> {:?}", digest, outcome);
    Ok((outcome, digest))
}

/// Identify the bootloader of a chip
///
/// Reads nothing when the chip has no boot block.
pub fn identify<'c, M, C, P>(
    session: &mut IspSession<M>,
    profile: &ChipProfile,
    fuses: &RawFuseBytes,
    catalog: &'c C,
    progress: &mut P,
) -> Result<BootloaderReport<'c>>
where
    M: IspMaster,
    C: ImageCatalog + ?Sized,
    P: ScanProgress + ?Sized,
{
    let Some(region) = boot_region(profile, fuses) else {
        log::debug!("bootloader: {} has no boot block", profile.name);
        return Ok(BootloaderReport::not_supported());
    };

    let mut reader = MemoryReader::for_chip(session, profile);
    let (outcome, digest) = identify_region(&mut reader, region, catalog, progress, |_, _| {})?;

    Ok(BootloaderReport {
        outcome,
        region: Some(region),
        digest: Some(digest),
    })
}
