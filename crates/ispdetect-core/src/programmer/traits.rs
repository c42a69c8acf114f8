//! Programmer trait definitions

use crate::error::Result;

/// ISP bus master
///
/// This trait represents a programmer that owns the four ISP lines of a
/// target: the serial clock (SCK), MOSI, MISO and the target's RESET pin.
/// The bus is a globally exclusive resource: at most one session drives it
/// at any time, and every `transfer` completes before the next one starts.
///
/// ## Timing
///
/// All waiting goes through [`IspMaster::delay_us`]. Hardware masters sleep,
/// emulated masters return immediately so that tests never block.
pub trait IspMaster {
    /// Acquire the bus
    ///
    /// Configures SCK, MOSI and RESET as outputs with SCK low, at a clock
    /// rate suitable for the target.
    fn begin_session(&mut self) -> Result<()>;

    /// Release the bus lines so the target can run on its own
    ///
    /// Must be safe to call when no session is active.
    fn end_session(&mut self);

    /// Exchange one byte, MSB first (SPI mode 0)
    ///
    /// Returns the byte clocked in on MISO while `byte` was clocked out.
    fn transfer(&mut self, byte: u8) -> Result<u8>;

    /// Drive the target reset line
    ///
    /// `active = true` holds the target in reset, which is the state the
    /// target must be in to accept programming commands.
    fn set_reset(&mut self, active: bool) -> Result<()>;

    /// Approximate period of one bus clock cycle in nanoseconds
    fn clock_period_ns(&self) -> u64;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Delay for the specified number of milliseconds
    fn delay_ms(&mut self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

// Blanket impl for boxed masters to allow trait objects
#[cfg(feature = "alloc")]
impl IspMaster for alloc::boxed::Box<dyn IspMaster> {
    fn begin_session(&mut self) -> Result<()> {
        (**self).begin_session()
    }

    fn end_session(&mut self) {
        (**self).end_session()
    }

    fn transfer(&mut self, byte: u8) -> Result<u8> {
        (**self).transfer(byte)
    }

    fn set_reset(&mut self, active: bool) -> Result<()> {
        (**self).set_reset(active)
    }

    fn clock_period_ns(&self) -> u64 {
        (**self).clock_period_ns()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

impl<M: IspMaster + ?Sized> IspMaster for &mut M {
    fn begin_session(&mut self) -> Result<()> {
        (**self).begin_session()
    }

    fn end_session(&mut self) {
        (**self).end_session()
    }

    fn transfer(&mut self, byte: u8) -> Result<u8> {
        (**self).transfer(byte)
    }

    fn set_reset(&mut self, active: bool) -> Result<()> {
        (**self).set_reset(active)
    }

    fn clock_period_ns(&self) -> u64 {
        (**self).clock_period_ns()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Information about a programmer
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
}
