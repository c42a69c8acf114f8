//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a fuse byte given as hex (`0xDE`, `DE`) or binary (`0b11011110`)
fn parse_fuse_byte(s: &str) -> Result<u8, String> {
    let (digits, radix) = if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        (bin, 2)
    } else {
        (s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s), 16)
    };
    u8::from_str_radix(digits, radix).map_err(|e| format!("Invalid fuse byte '{}': {}", s, e))
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "ispdetect")]
#[command(author, version, about = "AVR chip detector and fuse calculator", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to extra bootloader definitions (a .ron file or a directory of them)
    /// Defaults to looking in ./bootloaders/ and /usr/share/ispdetect/bootloaders/
    #[arg(long, global = true)]
    pub bootloader_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the attached chip, decode its fuses and identify its bootloader
    Detect {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Show a hex dump of the boot block
        #[arg(long)]
        show_bootloader: bool,

        /// Skip the boot block scan
        #[arg(long, conflicts_with = "show_bootloader")]
        no_bootloader: bool,

        /// Number of program memory bytes to dump (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "256")]
        dump_len: u32,

        /// Give up entering programming mode after this many attempts
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u8).range(1..))]
        attempts: u8,
    },

    /// Read program memory to a file
    Dump {
        /// Programmer to use
        #[arg(short, long, help = programmer_help())]
        programmer: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Number of bytes to read (defaults to the rest of program memory)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Decode fuse bytes for a chip without hardware
    Decode {
        /// Chip name (see list-chips)
        #[arg(short, long)]
        chip: String,

        /// Low fuse byte (hex, or binary with 0b prefix)
        #[arg(long, value_parser = parse_fuse_byte, default_value = "0xFF")]
        lfuse: u8,

        /// High fuse byte
        #[arg(long, value_parser = parse_fuse_byte, default_value = "0xFF")]
        hfuse: u8,

        /// Extended fuse byte
        #[arg(long, value_parser = parse_fuse_byte, default_value = "0xFF")]
        efuse: u8,

        /// Lock byte
        #[arg(long, value_parser = parse_fuse_byte, default_value = "0xFF")]
        lock: u8,
    },

    /// Compute the fingerprint of a bootloader image file
    Fingerprint {
        /// Raw binary image
        #[arg(short, long)]
        input: PathBuf,

        /// Pad the image with 0xFF to this size (the boot block size)
        #[arg(long, value_parser = parse_hex_u32)]
        pad_to: Option<u32>,

        /// Name for the generated database entry (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// List supported programmers
    ListProgrammers,

    /// List supported chips
    ListChips {
        /// Filter by name
        #[arg(long)]
        filter: Option<String>,
    },

    /// List known bootloader images
    ListBootloaders,
}
