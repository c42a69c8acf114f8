//! Text rendering shared by the detect and decode commands

use ispdetect_core::bootloader::{BootloaderOutcome, BootloaderReport};
use ispdetect_core::fuse::{DecodedField, FieldValue, FuseByte, RawFuseBytes};

/// Bytes per hex dump line
const DUMP_WIDTH: usize = 16;

/// Flag descriptions are padded with dots to this column
const FLAG_COLUMN: usize = 40;

/// Shown in place of the fields for unknown chips and chips without a layout
pub const NO_FUSE_INFO: &str = "No fuse information for this processor.";

/// Render one decoded field in fuse calculator style
///
/// `hfuse & 00100000 :: Enable Serial (ICSP) Programming........ [X]`
pub fn format_field(field: &DecodedField) -> String {
    let prefix = format!("{:>5} & {:08b} :: ", field.byte.label(), field.mask);
    match field.value {
        FieldValue::Flag(_) => format!(
            "{}{:.<width$} {}",
            prefix,
            field.label,
            field.value,
            width = FLAG_COLUMN
        ),
        _ => format!("{}{}: {}", prefix, field.label, field.value),
    }
}

/// Print the raw configuration bytes
pub fn print_fuse_bytes(raw: &RawFuseBytes) {
    for byte in FuseByte::ALL {
        println!("{:>11}: {:02X}", byte.label(), raw.get(byte));
    }
    println!("{:>11}: {:02X}", "calibration", raw.calibration);
}

/// Print decoded fields, or a note when the chip has none
pub fn print_fields<I: IntoIterator<Item = DecodedField>>(fields: I) {
    for line in field_lines(fields) {
        println!("{}", line);
    }
}

/// Render decoded fields, one line each
///
/// An empty field list renders as a single note.
pub fn field_lines<I: IntoIterator<Item = DecodedField>>(fields: I) -> Vec<String> {
    let lines: Vec<String> = fields
        .into_iter()
        .map(|field| format!("    {}", format_field(&field)))
        .collect();
    if lines.is_empty() {
        vec![NO_FUSE_INFO.to_string()]
    } else {
        lines
    }
}

/// Render a hex dump with absolute addresses
pub fn hex_dump(start: u32, data: &[u8]) -> Vec<String> {
    data.chunks(DUMP_WIDTH)
        .enumerate()
        .map(|(i, chunk)| {
            let addr = start as usize + i * DUMP_WIDTH;
            let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            format!("{:06X}: {}", addr, bytes.join(" "))
        })
        .collect()
}

/// Print the outcome of a boot block scan
pub fn print_bootloader(report: &BootloaderReport<'_>, contents: &[u8]) {
    println!();
    let Some(region) = report.region else {
        println!("No bootloader support.");
        return;
    };

    println!("Bootloader is {}:", region);
    for line in hex_dump(region.start, contents) {
        println!("{}", line);
    }
    if let Some(digest) = report.digest {
        println!("MD5 sum: {}", digest);
    }
    match report.outcome {
        BootloaderOutcome::Identified(name) => println!("Bootloader name: {}", name),
        outcome => println!("{}.", outcome),
    }
}
