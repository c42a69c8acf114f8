//! Decode command implementation
//!
//! Offline fuse calculator: runs the decoder on user-supplied bytes.

use super::report;
use ispdetect_core::bootloader;
use ispdetect_core::chip;
use ispdetect_core::fuse::{self, RawFuseBytes};

/// Decode fuse bytes for a named chip
pub fn run_decode(chip_name: &str, raw: RawFuseBytes) -> Result<(), Box<dyn std::error::Error>> {
    let profile = chip::find_by_name(chip_name).ok_or_else(|| {
        format!(
            "Unknown chip: {}\nUse 'ispdetect list-chips' to see supported chips",
            chip_name
        )
    })?;

    println!("Processor = {}", profile.name);
    println!("Signature = {}", profile.signature());
    println!();
    report::print_fuse_bytes(&raw);
    report::print_fields(fuse::decode(profile, &raw).into_iter().flatten());

    if let Some(region) = bootloader::boot_region(profile, &raw) {
        println!();
        println!("Bootloader is {}", region);
    }
    Ok(())
}
