//! List commands implementation

use crate::programmers;
use ispdetect_core::bootloader::BootloaderDatabase;
use ispdetect_core::chip;

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in programmers::available_programmers() {
        println!("  {:<12} - {}", p.name, p.description);
        if !p.aliases.is_empty() {
            println!("  {:<12}   aliases: {}", "", p.aliases.join(", "));
        }
    }
}

/// List all supported chips
pub fn list_chips(name_filter: Option<&str>) {
    println!("Supported chips:");
    println!();
    println!(
        "{:<14} {:>10} {:>10} {:>10} {:>6}",
        "Name", "Signature", "Flash", "Boot base", "Fuses"
    );
    println!("{}", "-".repeat(54));

    for chip in chip::CHIPS {
        // Apply name filter if specified
        if let Some(filter) = name_filter {
            if !chip.name.to_lowercase().contains(&filter.to_lowercase()) {
                continue;
            }
        }

        let boot_str = if chip.has_boot_section() {
            format_size(chip.base_boot_size)
        } else {
            "-".to_string()
        };

        println!(
            "{:<14} {:>10} {:>10} {:>10} {:>6}",
            chip.name,
            chip.signature().to_string(),
            format_size(chip.flash_size),
            boot_str,
            if chip.fuse_layout.is_some() { "yes" } else { "no" }
        );
    }
}

/// List all known bootloader images
pub fn list_bootloaders(db: &BootloaderDatabase) {
    println!("Known bootloaders ({}):", db.len());
    println!();
    for image in db.iter() {
        println!("  {}  {}", image.fingerprint, image.name);
    }
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
