//! ispdetect - AVR chip detector and fuse calculator
//!
//! Attaches to an AVR microcontroller over its serial programming (ISP)
//! interface, identifies it from its signature, decodes its fuse and lock
//! bytes and recognises the bootloader in its boot block by MD5 digest.
//!
//! # Architecture
//!
//! The detection logic lives in `ispdetect-core` and runs against any
//! `IspMaster`:
//! - **Hardware masters** (linux_gpio) - bitbang the four ISP lines
//! - **Emulated masters** (dummy) - an in-memory AVR for testing
//!
//! The tool is read-only: no command writes flash, fuses or lock bits.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use ispdetect_core::bootloader::BootloaderDatabase;
use ispdetect_core::detect::DetectOptions;
use ispdetect_core::fuse::RawFuseBytes;
use ispdetect_core::isp::HandshakeConfig;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // Load bootloader database
    let db = match load_bootloader_database(cli.bootloader_db.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load bootloader database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Loaded {} bootloader fingerprints", db.len());

    match cli.command {
        Commands::Detect {
            programmer,
            show_bootloader,
            no_bootloader,
            dump_len,
            attempts,
        } => {
            let options = DetectOptions {
                dump_len,
                scan_bootloader: !no_bootloader,
                keep_boot_contents: show_bootloader,
            };
            let handshake = HandshakeConfig::default().with_max_attempts(attempts);
            commands::detect::run_detect(&programmer, &db, &options, handshake)
        }
        Commands::Dump {
            programmer,
            output,
            start,
            length,
        } => commands::dump::run_dump(&programmer, &output, start, length),
        Commands::Decode {
            chip,
            lfuse,
            hfuse,
            efuse,
            lock,
        } => {
            // Calibration is a factory value and plays no part in decoding
            let raw = RawFuseBytes::new(lfuse, hfuse, efuse, lock, 0xFF);
            commands::decode::run_decode(&chip, raw)
        }
        Commands::Fingerprint {
            input,
            pad_to,
            name,
        } => commands::fingerprint::run_fingerprint(&input, pad_to, name.as_deref(), &db),
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListChips { filter } => {
            commands::list_chips(filter.as_deref());
            Ok(())
        }
        Commands::ListBootloaders => {
            commands::list_bootloaders(&db);
            Ok(())
        }
    }
}

/// Load the bootloader database from the specified path or default locations
///
/// The compiled-in images always come first.
fn load_bootloader_database(
    path: Option<&Path>,
) -> Result<BootloaderDatabase, Box<dyn std::error::Error>> {
    let mut db = BootloaderDatabase::with_builtin();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() || path.is_file() {
            let count = db.load_path(path)?;
            log::info!("Loaded {} bootloaders from {}", count, path.display());
        } else {
            return Err(format!("Bootloader database path not found: {}", path.display()).into());
        }
    } else {
        // Try default locations
        let default_paths = [
            PathBuf::from("bootloaders"),
            PathBuf::from("/usr/share/ispdetect/bootloaders"),
            PathBuf::from("/usr/local/share/ispdetect/bootloaders"),
        ];

        for dir in &default_paths {
            if dir.is_dir() {
                match db.load_dir(dir) {
                    Ok(count) => {
                        log::debug!("Loaded {} bootloaders from {}", count, dir.display());
                    }
                    Err(e) => {
                        log::warn!("Failed to load bootloaders from {}: {}", dir.display(), e);
                    }
                }
            }
        }
    }

    Ok(db)
}
