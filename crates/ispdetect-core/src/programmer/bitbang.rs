//! Bitbang ISP master trait
//!
//! This module provides the pin-level trait for programmers that implement
//! the ISP bus via software-controlled GPIO pins (bitbanging), e.g.
//! `linux_gpio` or a microcontroller's spare port pins.
//!
//! Hardware-accelerated programmers should **not** use these helpers.
//! Instead, they implement [`IspMaster::transfer`](super::IspMaster) with
//! their native SPI engine.
//!
//! ## Bus discipline
//!
//! AVR serial programming is SPI mode 0: MOSI is set while SCK is low, the
//! target samples it on the rising edge, and MISO is valid while SCK is
//! high. Bytes go MSB first and each byte out produces one byte in.

/// Trait for low-level bitbang ISP operations
pub trait BitbangIspMaster {
    /// Set clock line value
    fn set_sck(&mut self, high: bool);

    /// Set MOSI line value
    fn set_mosi(&mut self, high: bool);

    /// Get MISO line value
    fn get_miso(&self) -> bool;

    /// Set the target reset line (`active = true` holds the target in reset)
    fn set_reset_line(&mut self, active: bool);

    /// Delay for half a clock period
    fn half_period_delay(&self);

    /// Optional: Set SCK and get MISO atomically (optimization)
    ///
    /// Default implementation calls `set_sck` then `get_miso`.
    fn set_sck_get_miso(&mut self, sck: bool) -> bool {
        self.set_sck(sck);
        self.get_miso()
    }
}

/// Exchange one byte full-duplex (MSB first, SPI mode 0)
///
/// Leaves SCK low on return.
pub fn transfer_byte<M: BitbangIspMaster + ?Sized>(master: &mut M, byte: u8) -> u8 {
    let mut received = 0u8;
    for i in (0..8).rev() {
        master.set_mosi((byte >> i) & 1 != 0);
        master.half_period_delay();
        received <<= 1;
        if master.set_sck_get_miso(true) {
            received |= 1;
        }
        master.half_period_delay();
        master.set_sck(false);
    }
    received
}

/// Exchange multiple bytes, writing the received bytes into `rx`
///
/// `rx` must be at least as long as `tx`.
pub fn transfer_bytes<M: BitbangIspMaster + ?Sized>(master: &mut M, tx: &[u8], rx: &mut [u8]) {
    for (out, slot) in tx.iter().zip(rx.iter_mut()) {
        *slot = transfer_byte(master, *out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Loopback pins: MISO reads back whatever MOSI was set to
    struct Loopback {
        mosi: bool,
        sck: bool,
        rising_edges: Cell<u32>,
    }

    impl BitbangIspMaster for Loopback {
        fn set_sck(&mut self, high: bool) {
            if high && !self.sck {
                self.rising_edges.set(self.rising_edges.get() + 1);
            }
            self.sck = high;
        }

        fn set_mosi(&mut self, high: bool) {
            self.mosi = high;
        }

        fn get_miso(&self) -> bool {
            self.mosi
        }

        fn set_reset_line(&mut self, _active: bool) {}

        fn half_period_delay(&self) {}
    }

    #[test]
    fn test_loopback_transfer() {
        let mut pins = Loopback {
            mosi: false,
            sck: false,
            rising_edges: Cell::new(0),
        };

        assert_eq!(transfer_byte(&mut pins, 0xAC), 0xAC);
        assert_eq!(transfer_byte(&mut pins, 0x53), 0x53);
        assert_eq!(pins.rising_edges.get(), 16);
        assert!(!pins.sck);
    }

    #[test]
    fn test_transfer_bytes() {
        let mut pins = Loopback {
            mosi: false,
            sck: false,
            rising_edges: Cell::new(0),
        };
        let mut rx = [0u8; 4];
        transfer_bytes(&mut pins, &[0x30, 0x00, 0x01, 0x00], &mut rx);
        assert_eq!(rx, [0x30, 0x00, 0x01, 0x00]);
    }
}
