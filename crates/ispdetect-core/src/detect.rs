//! Full detection run
//!
//! Drives one session from handshake to teardown: identify the chip, read
//! and decode its fuses, identify the bootloader, then dump the start of
//! program memory. Only bus failures abort a run; everything the target
//! reports is recorded in the [`DetectionReport`].

use alloc::vec::Vec;

use crate::bootloader::{self, BootloaderReport, ImageCatalog, ScanProgress};
use crate::chip::ChipProfile;
use crate::context::{self, TargetContext};
use crate::error::Result;
use crate::fuse::DecodedField;
use crate::isp::IspSession;
use crate::programmer::IspMaster;

/// Default number of program memory bytes dumped
pub const DEFAULT_DUMP_LEN: u32 = 256;

/// What a detection run reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    /// Number of bytes read from the start of program memory
    pub dump_len: u32,
    /// Scan and identify the boot block
    pub scan_bootloader: bool,
    /// Keep the boot block bytes in the report
    pub keep_boot_contents: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            dump_len: DEFAULT_DUMP_LEN,
            scan_bootloader: true,
            keep_boot_contents: false,
        }
    }
}

/// Everything learned in one detection run
#[derive(Debug, Clone)]
pub struct DetectionReport<'c> {
    /// Handshake attempts needed
    pub attempts: u8,
    /// Signature, profile and raw fuses
    pub target: TargetContext<'c>,
    /// Decoded fuse fields, empty without fuse information
    pub fields: Vec<DecodedField>,
    /// Boot block result, `None` for unknown chips or when not scanned
    pub bootloader: Option<BootloaderReport<'c>>,
    /// Boot block bytes, if requested
    pub boot_contents: Vec<u8>,
    /// First bytes of program memory
    pub program_head: Vec<u8>,
}

impl DetectionReport<'_> {
    /// Matching profile, if any
    pub fn profile(&self) -> Option<&ChipProfile> {
        self.target.profile
    }

    /// Whether the chip has fuse information to show
    pub fn has_fuse_info(&self) -> bool {
        self.target.profile.is_some_and(|p| p.fuse_layout.is_some())
    }
}

/// Run a full detection
///
/// The session is torn down before returning, on success and on error.
pub fn run<'c, M, C, P>(
    session: &mut IspSession<M>,
    chips: &'c [ChipProfile],
    images: &'c C,
    options: &DetectOptions,
    progress: &mut P,
) -> Result<DetectionReport<'c>>
where
    M: IspMaster,
    C: ImageCatalog + ?Sized,
    P: ScanProgress + ?Sized,
{
    let result = session
        .establish()
        .and_then(|()| inspect(session, chips, images, options, progress));
    session.teardown();
    result
}

fn inspect<'c, M, C, P>(
    session: &mut IspSession<M>,
    chips: &'c [ChipProfile],
    images: &'c C,
    options: &DetectOptions,
    progress: &mut P,
) -> Result<DetectionReport<'c>>
where
    M: IspMaster,
    C: ImageCatalog + ?Sized,
    P: ScanProgress + ?Sized,
{
    let attempts = session.attempts();
    let target = context::probe(session, chips)?;
    let fields: Vec<DecodedField> = target.decode_fuses().into_iter().flatten().collect();

    let mut boot_contents = Vec::new();
    let bootloader = match target.profile {
        Some(profile) if options.scan_bootloader => {
            Some(scan_bootloader(session, &target, profile, images, options, progress, &mut boot_contents)?)
        }
        _ => None,
    };

    let mut reader = target.memory_reader(session);
    let dump_len = match reader.limit() {
        Some(limit) => options.dump_len.min(limit),
        None => options.dump_len,
    };
    let mut program_head = alloc::vec![0u8; dump_len as usize];
    reader.read(0, &mut program_head)?;

    Ok(DetectionReport {
        attempts,
        target,
        fields,
        bootloader,
        boot_contents,
        program_head,
    })
}

fn scan_bootloader<'c, M, C, P>(
    session: &mut IspSession<M>,
    target: &TargetContext<'c>,
    profile: &ChipProfile,
    images: &'c C,
    options: &DetectOptions,
    progress: &mut P,
    contents: &mut Vec<u8>,
) -> Result<BootloaderReport<'c>>
where
    M: IspMaster,
    C: ImageCatalog + ?Sized,
    P: ScanProgress + ?Sized,
{
    let Some(region) = bootloader::boot_region(profile, &target.fuses) else {
        return Ok(BootloaderReport::not_supported());
    };

    let mut reader = target.memory_reader(session);
    let keep = options.keep_boot_contents;
    if keep {
        contents.reserve(region.len as usize);
    }
    let (outcome, digest) =
        bootloader::identify_region(&mut reader, region, images, progress, |_, byte| {
            if keep {
                contents.push(byte);
            }
        })?;

    Ok(BootloaderReport {
        outcome,
        region: Some(region),
        digest: Some(digest),
    })
}
