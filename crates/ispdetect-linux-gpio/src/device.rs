//! Linux GPIO ISP bitbanging device implementation
//!
//! This module provides the `LinuxGpioIsp` struct that implements the
//! `IspMaster` trait using Linux's GPIO character device interface
//! (gpiocdev).
//!
//! The ISP bus is implemented via bit-banging: SCK, MOSI and RESET are
//! driven as outputs and MISO is sampled as an input. The lines are only
//! requested while a session is active, so the target runs undisturbed
//! the rest of the time.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::chip::Chip;
use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use ispdetect_core::error::{Error as CoreError, Result as CoreResult};
use ispdetect_core::programmer::bitbang::{self, BitbangIspMaster};
use ispdetect_core::programmer::IspMaster;

/// GPIO line indices
#[derive(Debug, Clone, Copy)]
enum Line {
    Reset = 0,
    Sck = 1,
    Mosi = 2,
    Miso = 3,
}

/// Number of GPIO lines we use
const NUM_LINES: usize = 4;

/// Default half-period delay in nanoseconds (for ~100 kHz ISP clock)
///
/// Slow enough for targets running from the factory 1 MHz clock, which
/// need SCK below a quarter of the CPU clock.
const DEFAULT_HALF_PERIOD_NS: u64 = 5000;

/// Configuration for opening a Linux GPIO ISP device
#[derive(Debug, Clone)]
pub struct LinuxGpioIspConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// RESET GPIO line offset
    pub reset: Offset,
    /// SCK (Clock) GPIO line offset
    pub sck: Offset,
    /// MOSI (Master Out Slave In) GPIO line offset
    pub mosi: Offset,
    /// MISO (Master In Slave Out) GPIO line offset
    pub miso: Offset,
    /// Half-period delay in nanoseconds
    pub half_period_ns: u64,
    /// Drive RESET high to hold the target in reset
    ///
    /// AVR targets are held in reset with the pin low. Set this when the
    /// line goes through an inverting buffer or transistor.
    pub reset_active_high: bool,
}

impl Default for LinuxGpioIspConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            reset: 0,
            sck: 0,
            mosi: 0,
            miso: 0,
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
            reset_active_high: false,
        }
    }
}

impl LinuxGpioIspConfig {
    /// Create a new configuration with the given device path and pins
    pub fn new(
        device: impl Into<String>,
        reset: Offset,
        sck: Offset,
        mosi: Offset,
        miso: Offset,
    ) -> Self {
        Self {
            device: device.into(),
            reset,
            sck,
            mosi,
            miso,
            ..Default::default()
        }
    }

    /// Set the half-period delay in nanoseconds
    pub fn with_half_period_ns(mut self, ns: u64) -> Self {
        self.half_period_ns = ns;
        self
    }

    /// Set ISP clock speed in Hz (approximate, via half-period calculation)
    pub fn with_speed_hz(mut self, hz: u32) -> Self {
        // half_period = 1_000_000_000 / (2 * frequency) in nanoseconds
        if hz > 0 {
            self.half_period_ns = 500_000_000 / hz as u64;
        }
        self
    }

    /// Invert the RESET line polarity
    pub fn with_reset_active_high(mut self, active_high: bool) -> Self {
        self.reset_active_high = active_high;
        self
    }

    fn offsets(&self) -> [Offset; NUM_LINES] {
        let mut offsets = [0; NUM_LINES];
        offsets[Line::Reset as usize] = self.reset;
        offsets[Line::Sck as usize] = self.sck;
        offsets[Line::Mosi as usize] = self.mosi;
        offsets[Line::Miso as usize] = self.miso;
        offsets
    }

    fn validate(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        const NAMES: [&str; NUM_LINES] = ["reset", "sck", "mosi", "miso"];
        let offsets = self.offsets();
        for i in 0..NUM_LINES {
            for j in i + 1..NUM_LINES {
                if offsets[i] == offsets[j] {
                    return Err(LinuxGpioError::DuplicateLine {
                        offset: offsets[i],
                        first: NAMES[i],
                        second: NAMES[j],
                    });
                }
            }
        }
        Ok(())
    }

    /// Line level that holds the target in reset (or releases it)
    fn reset_value(&self, active: bool) -> Value {
        if active == self.reset_active_high {
            Value::Active
        } else {
            Value::Inactive
        }
    }
}

/// Linux GPIO ISP programmer using bitbanging
///
/// This struct implements the `IspMaster` trait for Linux systems using
/// GPIO pins controlled via the gpiocdev crate (character device
/// interface). Byte transfers go through `BitbangIspMaster`.
pub struct LinuxGpioIsp {
    config: LinuxGpioIspConfig,
    /// GPIO line request handle, held only during a session
    request: Option<Request>,
    /// GPIO line offsets indexed by Line enum
    offsets: [Offset; NUM_LINES],
}

impl LinuxGpioIsp {
    /// Open a Linux GPIO ISP device with the given configuration
    ///
    /// Checks that the chip exists and that the lines are in range. The
    /// lines themselves are requested by [`IspMaster::begin_session`].
    pub fn open(config: &LinuxGpioIspConfig) -> Result<Self> {
        config.validate()?;

        log::debug!("linux_gpio: Opening device {}", config.device);

        let chip = Chip::from_path(&config.device).map_err(|source| {
            LinuxGpioError::ChipOpenFailed {
                path: config.device.clone(),
                source,
            }
        })?;
        let info = chip.info().map_err(|source| LinuxGpioError::ChipOpenFailed {
            path: config.device.clone(),
            source,
        })?;

        let offsets = config.offsets();
        if let Some(bad) = offsets.iter().find(|&&o| o >= info.num_lines) {
            return Err(LinuxGpioError::InvalidParameter(format!(
                "line {} out of range, {} has {} lines",
                bad, config.device, info.num_lines
            )));
        }

        log::info!(
            "linux_gpio: Opened {} (reset={}, sck={}, mosi={}, miso={}, {} ns half period)",
            config.device,
            config.reset,
            config.sck,
            config.mosi,
            config.miso,
            config.half_period_ns
        );

        Ok(Self {
            config: config.clone(),
            request: None,
            offsets,
        })
    }

    /// Whether the lines are currently requested
    pub fn is_active(&self) -> bool {
        self.request.is_some()
    }

    fn request_lines(&self) -> Result<Request> {
        // Initial state: RESET released, SCK=0, MOSI=0, MISO=input
        let mut req_config = Config::default();
        req_config
            .with_line(self.config.reset)
            .as_output(self.config.reset_value(false));
        req_config
            .with_line(self.config.sck)
            .as_output(Value::Inactive);
        req_config
            .with_line(self.config.mosi)
            .as_output(Value::Inactive);
        req_config.with_line(self.config.miso).as_input();

        Request::from_config(req_config)
            .on_chip(&self.config.device)
            .with_consumer("ispdetect")
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)
    }

    fn release_lines(request: &Request, offsets: &[Offset; NUM_LINES]) -> Result<()> {
        let mut cfg = Config::default();
        for &offset in offsets {
            cfg.with_line(offset).as_input();
        }
        request
            .reconfigure(&cfg)
            .map_err(LinuxGpioError::ReconfigureFailed)
    }

    fn set_line(&mut self, line: Line, value: Value) {
        let Some(request) = &self.request else {
            log::error!("linux_gpio: {:?} driven without an active session", line);
            return;
        };
        if let Err(e) = request.set_value(self.offsets[line as usize], value) {
            log::error!("Failed to set {:?}: {}", line, e);
        }
    }
}

impl BitbangIspMaster for LinuxGpioIsp {
    fn set_sck(&mut self, high: bool) {
        let value = if high { Value::Active } else { Value::Inactive };
        self.set_line(Line::Sck, value);
    }

    fn set_mosi(&mut self, high: bool) {
        let value = if high { Value::Active } else { Value::Inactive };
        self.set_line(Line::Mosi, value);
    }

    fn get_miso(&self) -> bool {
        let Some(request) = &self.request else {
            return false;
        };
        match request.value(self.offsets[Line::Miso as usize]) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("Failed to get MISO: {}", e);
                false
            }
        }
    }

    fn set_reset_line(&mut self, active: bool) {
        let value = self.config.reset_value(active);
        self.set_line(Line::Reset, value);
    }

    fn half_period_delay(&self) {
        if self.config.half_period_ns > 0 {
            std::thread::sleep(std::time::Duration::from_nanos(self.config.half_period_ns));
        }
    }
}

impl IspMaster for LinuxGpioIsp {
    fn begin_session(&mut self) -> CoreResult<()> {
        if self.request.is_some() {
            return Ok(());
        }
        let request = self.request_lines().map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::ProgrammerError
        })?;
        self.request = Some(request);
        log::debug!("linux_gpio: lines requested");
        Ok(())
    }

    fn end_session(&mut self) {
        if let Some(request) = self.request.take() {
            if let Err(e) = Self::release_lines(&request, &self.offsets) {
                log::warn!("linux_gpio: {}", e);
            }
            log::debug!("linux_gpio: lines released");
        }
    }

    fn transfer(&mut self, byte: u8) -> CoreResult<u8> {
        if self.request.is_none() {
            return Err(CoreError::ProgrammerError);
        }
        Ok(bitbang::transfer_byte(self, byte))
    }

    fn set_reset(&mut self, active: bool) -> CoreResult<()> {
        let Some(request) = &self.request else {
            return Err(CoreError::ProgrammerError);
        };
        request
            .set_value(
                self.offsets[Line::Reset as usize],
                self.config.reset_value(active),
            )
            .map_err(|e| {
                log::error!("Failed to set RESET: {}", e);
                CoreError::ProgrammerError
            })
    }

    fn clock_period_ns(&self) -> u64 {
        2 * self.config.half_period_ns
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

impl Drop for LinuxGpioIsp {
    fn drop(&mut self) {
        self.end_session();
    }
}

fn parse_line(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidParameter(format!("Invalid {} value: {}", name, value)))
}

/// Parse programmer options into a configuration
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioIspConfig> {
    let mut config = LinuxGpioIspConfig::default();
    let mut have_reset = false;
    let mut have_sck = false;
    let mut have_mosi = false;
    let mut have_miso = false;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("Invalid gpiochip value: {}", value))
                })?);
            }
            "reset" => {
                config.reset = parse_line("reset", value)?;
                have_reset = true;
            }
            "sck" => {
                config.sck = parse_line("sck", value)?;
                have_sck = true;
            }
            "mosi" => {
                config.mosi = parse_line("mosi", value)?;
                have_mosi = true;
            }
            "miso" => {
                config.miso = parse_line("miso", value)?;
                have_miso = true;
            }
            "spispeed" => {
                let speed_khz: u32 = value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("Invalid spispeed value: {}", value))
                })?;
                if speed_khz == 0 {
                    return Err(LinuxGpioError::InvalidParameter(
                        "spispeed must be at least 1 kHz".to_string(),
                    ));
                }
                config = config.with_speed_hz(speed_khz.saturating_mul(1000));
            }
            "reset_active_high" => {
                config.reset_active_high = matches!(*value, "1" | "yes" | "true" | "");
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    // Handle dev vs gpiochip
    if config.device.is_empty() {
        match gpiochip {
            Some(n) if n > 9 => {
                return Err(LinuxGpioError::InvalidParameter(
                    "Maximum gpiochip number supported is 9".to_string(),
                ));
            }
            Some(n) => config.device = format!("/dev/gpiochip{}", n),
            None => return Err(LinuxGpioError::NoDevice),
        }
    } else if gpiochip.is_some() {
        return Err(LinuxGpioError::InvalidParameter(
            "Only one of 'dev' or 'gpiochip' can be specified".to_string(),
        ));
    }

    if !have_reset {
        return Err(LinuxGpioError::MissingParameter("reset"));
    }
    if !have_sck {
        return Err(LinuxGpioError::MissingParameter("sck"));
    }
    if !have_mosi {
        return Err(LinuxGpioError::MissingParameter("mosi"));
    }
    if !have_miso {
        return Err(LinuxGpioError::MissingParameter("miso"));
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PINS: [(&str, &str); 4] = [("reset", "25"), ("sck", "11"), ("mosi", "10"), ("miso", "9")];

    fn with_pins(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut options = PINS.to_vec();
        options.extend_from_slice(extra);
        options
    }

    #[test]
    fn test_parse_gpiochip_number() {
        let config = parse_options(&with_pins(&[("gpiochip", "0")])).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.reset, 25);
        assert_eq!(config.sck, 11);
        assert_eq!(config.mosi, 10);
        assert_eq!(config.miso, 9);
        assert_eq!(config.half_period_ns, DEFAULT_HALF_PERIOD_NS);
        assert!(!config.reset_active_high);
    }

    #[test]
    fn test_parse_speed_and_polarity() {
        let config = parse_options(&with_pins(&[
            ("dev", "/dev/gpiochip1"),
            ("spispeed", "50"),
            ("reset_active_high", "1"),
        ]))
        .unwrap();
        assert_eq!(config.device, "/dev/gpiochip1");
        assert_eq!(config.half_period_ns, 10_000);
        assert!(config.reset_active_high);
    }

    #[test]
    fn test_parse_device_errors() {
        assert!(matches!(parse_options(&PINS), Err(LinuxGpioError::NoDevice)));
        assert!(matches!(
            parse_options(&with_pins(&[("gpiochip", "10")])),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
        assert!(matches!(
            parse_options(&with_pins(&[("gpiochip", "0"), ("dev", "/dev/gpiochip0")])),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_parse_missing_and_duplicate_pins() {
        let options = [("gpiochip", "0"), ("sck", "11"), ("mosi", "10"), ("miso", "9")];
        assert!(matches!(
            parse_options(&options),
            Err(LinuxGpioError::MissingParameter("reset"))
        ));

        let options = [("gpiochip", "0"), ("reset", "11"), ("sck", "11"), ("mosi", "10"), ("miso", "9")];
        assert!(matches!(
            parse_options(&options),
            Err(LinuxGpioError::DuplicateLine { offset: 11, first: "reset", second: "sck" })
        ));
    }

    #[test]
    fn test_reset_polarity() {
        let config = LinuxGpioIspConfig::new("/dev/gpiochip0", 25, 11, 10, 9);
        assert_eq!(config.reset_value(true), Value::Inactive);
        assert_eq!(config.reset_value(false), Value::Active);

        let config = config.with_reset_active_high(true);
        assert_eq!(config.reset_value(true), Value::Active);
        assert_eq!(config.reset_value(false), Value::Inactive);
    }

    #[test]
    fn test_speed_hz() {
        let config = LinuxGpioIspConfig::default().with_speed_hz(250_000);
        assert_eq!(config.half_period_ns, 2000);
        let config = config.with_speed_hz(0);
        assert_eq!(config.half_period_ns, 2000);
    }
}
