//! Fingerprint command implementation

use ispdetect_core::bootloader::{BootloaderDatabase, Fingerprint, ImageCatalog};
use ispdetect_core::isp::opcodes;
use std::fs;
use std::path::Path;

/// Pad `data` with erased bytes up to `size`
///
/// Bootloader images are usually shorter than the boot block they are
/// flashed into. The rest of the block reads as erased flash, so the
/// fingerprint that detection computes covers the padding too.
pub fn pad_image(mut data: Vec<u8>, size: Option<u32>) -> Result<Vec<u8>, String> {
    if let Some(size) = size {
        let size = size as usize;
        if data.len() > size {
            return Err(format!(
                "Image is {} bytes, larger than the {} byte boot block",
                data.len(),
                size
            ));
        }
        data.resize(size, opcodes::ERASED);
    }
    Ok(data)
}

/// Render a bootloader database entry
pub fn ron_entry(name: &str, fingerprint: &Fingerprint) -> String {
    format!("(name: {:?}, md5: \"{}\"),", name, fingerprint)
}

/// Print the fingerprint of an image file as a database entry
pub fn run_fingerprint(
    input: &Path,
    pad_to: Option<u32>,
    name: Option<&str>,
    db: &BootloaderDatabase,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let raw_len = data.len();
    let data = pad_image(data, pad_to)?;
    let fingerprint = Fingerprint::of(&data);

    let name = match name {
        Some(n) => n.to_string(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string()),
    };

    println!("{} bytes ({} from file)", data.len(), raw_len);
    println!("MD5 sum: {}", fingerprint);
    if let Some(known) = db.find(&fingerprint) {
        println!("Already known as: {}", known);
    }
    println!();
    println!("{}", ron_entry(&name, &fingerprint));
    Ok(())
}
