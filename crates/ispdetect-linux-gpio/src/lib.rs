//! ispdetect-linux-gpio - Linux GPIO bitbang ISP support
//!
//! This crate provides access to an AVR target's serial programming
//! interface via GPIO bitbanging using the Linux character device GPIO
//! interface (gpiocdev).
//!
//! # Overview
//!
//! GPIO bitbanging drives the four ISP signals from regular GPIO pins,
//! without requiring a dedicated SPI controller. This is useful on
//! platforms like Raspberry Pi where GPIO pins are easily accessible and
//! the target's RESET pin needs a line of its own anyway.
//!
//! # Example
//!
//! ```no_run
//! use ispdetect_linux_gpio::{LinuxGpioIsp, LinuxGpioIspConfig};
//! use ispdetect_core::chip::Signature;
//! use ispdetect_core::isp::IspSession;
//! use ispdetect_core::protocol;
//!
//! // Configure GPIO pins for ISP
//! let config = LinuxGpioIspConfig::new("/dev/gpiochip0", 25, 11, 10, 9);
//! //                                    device          RST SCK MOSI MISO
//!
//! let mut session = IspSession::new(LinuxGpioIsp::open(&config)?);
//! session.establish()?;
//! let signature = Signature(protocol::read_signature(&mut session)?);
//! println!("Signature: {}", signature);
//! session.teardown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with ispdetect CLI
//!
//! ```bash
//! # Basic usage with GPIO chip and pin numbers
//! ispdetect detect -p linux_gpio:dev=/dev/gpiochip0,reset=25,sck=11,mosi=10,miso=9
//!
//! # Using gpiochip number instead of device path
//! ispdetect detect -p linux_gpio:gpiochip=0,reset=25,sck=11,mosi=10,miso=9
//!
//! # With a slower ISP clock (in kHz, approximate) for targets running at 128 kHz
//! ispdetect detect -p linux_gpio:gpiochip=0,reset=25,sck=11,mosi=10,miso=9,spispeed=20
//! ```
//!
//! # GPIO Pin Wiring
//!
//! Connect the target's ISP header to GPIO pins as follows:
//!
//! | ISP Pin | GPIO Function   | Description |
//! |---------|-----------------|-------------|
//! | RESET   | RESET (output)  | Held low during programming |
//! | SCK     | SCK (output)    | Serial Clock |
//! | MOSI    | MOSI (output)   | Master Out Slave In |
//! | MISO    | MISO (input)    | Master In Slave Out |
//! | GND     | GND             | Ground |
//!
//! Mind the voltage levels: a 5 V target needs a level shifter in front of
//! 3.3 V GPIO pins.
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioIsp, LinuxGpioIspConfig};
pub use error::{LinuxGpioError, Result};

/// Open a Linux GPIO ISP device and return a boxed IspMaster
///
/// This is a convenience function for use in the CLI programmer dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from programmer string parsing
///
/// # Example Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `reset=25` - RESET pin GPIO offset (required)
/// - `sck=11` - SCK pin GPIO offset (required)
/// - `mosi=10` - MOSI pin GPIO offset (required)
/// - `miso=9` - MISO pin GPIO offset (required)
/// - `spispeed=100` - ISP clock in kHz (optional, default ~100 kHz)
/// - `reset_active_high=1` - invert RESET for buffered lines (optional)
pub fn open_linux_gpio_isp(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn ispdetect_core::programmer::IspMaster>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    let isp = LinuxGpioIsp::open(&config)?;
    Ok(Box::new(isp))
}
