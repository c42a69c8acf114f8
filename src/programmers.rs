//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use ispdetect_core::programmer::{IspMaster, ProgrammerInfo};

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "Emulated AVR target for testing (chip=<name>,image=<path>,sync_after=<n>,nosync=1)",
    });

    #[cfg(feature = "linux-gpio")]
    programmers.push(ProgrammerInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpio"],
        description: "Linux GPIO bitbang ISP (dev=/dev/gpiochipN,reset=<n>,sck=<n>,mosi=<n>,miso=<n>)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");

    for p in &programmers {
        help.push_str(&format!("  {:12} - {}\n", p.name, p.description));
    }

    help
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Resolve a programmer name or alias to its canonical name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.iter().any(|a| *a == name))
        .map(|p| p.name)
}

/// Open the programmer named by a programmer string
///
/// The programmer string can be just the name (e.g., "dummy") or include
/// parameters (e.g., "linux_gpio:gpiochip=0,reset=25,sck=11,mosi=10,miso=9").
#[allow(unused_variables)]
pub fn open_programmer(programmer: &str) -> Result<Box<dyn IspMaster>, Box<dyn std::error::Error>> {
    let (name, options) = parse_programmer_string(programmer);

    let canonical_name = match find_programmer(name) {
        Some(n) => n,
        None => {
            return Err(unknown_programmer_error(name));
        }
    };

    match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            log::info!("Opening dummy programmer...");
            ispdetect_dummy::open_dummy(&options)
        }

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" => {
            log::info!("Opening Linux GPIO programmer...");
            ispdetect_linux_gpio::open_linux_gpio_isp(&options).map_err(|e| {
                format!(
                    "Failed to open Linux GPIO device: {}\n\
                     Make sure the gpiochip exists and you have read/write permissions.\n\
                     You may need to: sudo usermod -aG gpio $USER",
                    e
                )
                .into()
            })
        }

        _ => Err(unknown_programmer_error(name)),
    }
}

/// Parse a programmer string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2". An option
/// without `=` is a flag with an empty value.
pub fn parse_programmer_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter(|opt| !opt.is_empty())
            .map(|opt| opt.split_once('=').unwrap_or((opt, "")))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown programmer: {}\n\n", name);
    msg.push_str(&programmer_help());
    msg.push_str("\nUse 'ispdetect list-programmers' for more details");
    msg.into()
}
