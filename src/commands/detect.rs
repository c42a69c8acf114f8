//! Detect command implementation

use super::progress::IndicatifProgress;
use super::report;
use crate::programmers;
use ispdetect_core::bootloader::BootloaderDatabase;
use ispdetect_core::chip::CHIPS;
use ispdetect_core::detect::{self, DetectOptions, DetectionReport};
use ispdetect_core::isp::{HandshakeConfig, IspSession};

/// Run a full detection and print the report
pub fn run_detect(
    programmer: &str,
    images: &BootloaderDatabase,
    options: &DetectOptions,
    handshake: HandshakeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let master = programmers::open_programmer(programmer)?;
    let mut session = IspSession::with_config(master, handshake);

    println!("Attempting to enter programming mode ...");
    let mut progress = IndicatifProgress::new();
    let report = detect::run(&mut session, CHIPS, images, options, &mut progress)?;
    log::debug!("{} handshake attempt(s)", report.attempts);

    print_report(&report, options);
    Ok(())
}

fn print_report(report: &DetectionReport<'_>, options: &DetectOptions) {
    let target = &report.target;
    println!("Entered programming mode.");
    println!();
    println!("Signature = {}", target.signature);
    match target.profile {
        Some(profile) => {
            println!("Processor = {}", profile.name);
            println!("Flash memory size = {} bytes.", profile.flash_size);
        }
        None => println!("Unrecognized signature."),
    }
    println!();

    report::print_fuse_bytes(&target.fuses);
    report::print_fields(report.fields.iter().copied());

    if let Some(boot) = &report.bootloader {
        let contents = if options.keep_boot_contents {
            report.boot_contents.as_slice()
        } else {
            &[]
        };
        report::print_bootloader(boot, contents);
    }

    println!();
    println!("First {} bytes of program memory:", report.program_head.len());
    for line in report::hex_dump(0, &report.program_head) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ispdetect_core::chip::Signature;
    use ispdetect_core::context::TargetContext;
    use ispdetect_core::fuse::RawFuseBytes;

    #[test]
    fn test_unknown_chip_gets_fuse_note() {
        let report = DetectionReport {
            attempts: 1,
            target: TargetContext {
                signature: Signature([0x1E, 0x95, 0x10]),
                profile: None,
                fuses: RawFuseBytes::new(0xFF, 0xDE, 0xFD, 0xCF, 0x9A),
            },
            fields: Vec::new(),
            bootloader: None,
            boot_contents: Vec::new(),
            program_head: Vec::new(),
        };

        assert!(!report.has_fuse_info());
        assert_eq!(
            report::field_lines(report.fields.iter().copied()),
            [report::NO_FUSE_INFO]
        );
    }
}
