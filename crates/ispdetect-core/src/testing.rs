//! Scripted ISP master for unit tests
//!
//! Answers the serial programming instruction set the way an AVR target
//! does, from plain fields the tests fill in, and records every frame.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::isp::opcodes;
use crate::programmer::IspMaster;

pub(crate) struct ScriptedMaster {
    /// Programming Enable is acknowledged from this attempt on
    pub ack_on_attempt: Option<u8>,
    pub signature: [u8; 3],
    /// low, high, extended, lock, calibration
    pub fuses: [u8; 5],
    pub flash: Vec<u8>,

    pub frames: Vec<[u8; 4]>,
    pub reset_active: bool,
    pub reset_pulses: u32,
    pub delayed_us: u64,
    pub begin_sessions: u32,
    pub end_sessions: u32,
    pub extended_loads: Vec<u8>,
    pub fail_transfers: bool,
    pub fail_begin: bool,
    /// `set_reset` fails once it has succeeded this many times
    pub fail_reset_after: Option<u32>,
    pub clock_period_ns: u64,

    frame: [u8; 4],
    pos: usize,
    attempts: u8,
    programming: bool,
    extended: u8,
    reset_calls: u32,
}

impl ScriptedMaster {
    pub fn acking_after(attempt: u8) -> Self {
        Self::with_ack(Some(attempt))
    }

    pub fn never_acking() -> Self {
        Self::with_ack(None)
    }

    fn with_ack(ack_on_attempt: Option<u8>) -> Self {
        Self {
            ack_on_attempt,
            signature: [0x1E, 0x95, 0x0F],
            fuses: [0xFF, 0xDE, 0xFD, 0xCF, 0x9A],
            flash: vec![opcodes::ERASED; 32 * 1024],
            frames: Vec::new(),
            reset_active: false,
            reset_pulses: 0,
            delayed_us: 0,
            begin_sessions: 0,
            end_sessions: 0,
            extended_loads: Vec::new(),
            fail_transfers: false,
            fail_begin: false,
            fail_reset_after: None,
            clock_period_ns: 8_000,
            frame: [0; 4],
            pos: 0,
            attempts: 0,
            programming: false,
            extended: 0,
            reset_calls: 0,
        }
    }

    fn result_byte(&mut self) -> u8 {
        let [b1, b2, b3, _] = self.frame;
        if !self.programming {
            return 0x00;
        }
        match (b1, b2) {
            (opcodes::READ_SIGNATURE, _) => self.signature.get(b3 as usize).copied().unwrap_or(0xFF),
            (opcodes::READ_LOW_FUSE, opcodes::READ_LOW_FUSE_ARG) => self.fuses[0],
            (opcodes::READ_HIGH_FUSE, opcodes::READ_HIGH_FUSE_ARG) => self.fuses[1],
            (opcodes::READ_EXT_FUSE, opcodes::READ_EXT_FUSE_ARG) => self.fuses[2],
            (opcodes::READ_LOCK, opcodes::READ_LOCK_ARG) => self.fuses[3],
            (opcodes::READ_CALIBRATION, _) => self.fuses[4],
            (opcodes::LOAD_EXTENDED_ADDRESS, _) => {
                self.extended = b3;
                self.extended_loads.push(b3);
                0x00
            }
            (op, hi) if op & !opcodes::READ_HIGH_BYTE == opcodes::READ_PROGRAM_MEMORY => {
                let word = (u32::from(self.extended) << 16) | (u32::from(hi) << 8) | u32::from(b3);
                let high = u32::from(op & opcodes::READ_HIGH_BYTE != 0);
                self.flash
                    .get((word * 2 + high) as usize)
                    .copied()
                    .unwrap_or(opcodes::ERASED)
            }
            _ => 0x00,
        }
    }
}

impl IspMaster for ScriptedMaster {
    fn begin_session(&mut self) -> Result<()> {
        if self.fail_begin {
            return Err(Error::ProgrammerError);
        }
        self.begin_sessions += 1;
        Ok(())
    }

    fn end_session(&mut self) {
        self.end_sessions += 1;
    }

    fn transfer(&mut self, byte: u8) -> Result<u8> {
        if self.fail_transfers {
            return Err(Error::TransferFailed);
        }

        self.frame[self.pos] = byte;
        let reply = match self.pos {
            2 if self.frame[0] == opcodes::PROGRAM_ENABLE => {
                self.attempts += 1;
                if self.reset_active && self.ack_on_attempt.is_some_and(|n| self.attempts >= n) {
                    self.programming = true;
                    self.frame[1]
                } else {
                    0x00
                }
            }
            3 => self.result_byte(),
            // The target echoes the previous byte
            _ if self.pos > 0 => self.frame[self.pos - 1],
            _ => 0x00,
        };

        self.pos += 1;
        if self.pos == 4 {
            self.frames.push(self.frame);
            self.pos = 0;
        }
        Ok(reply)
    }

    fn set_reset(&mut self, active: bool) -> Result<()> {
        if self.fail_reset_after.is_some_and(|n| self.reset_calls >= n) {
            return Err(Error::ProgrammerError);
        }
        self.reset_calls += 1;
        if active && !self.reset_active {
            self.reset_pulses += 1;
        }
        if !active {
            self.programming = false;
            self.extended = 0;
        }
        self.reset_active = active;
        Ok(())
    }

    fn clock_period_ns(&self) -> u64 {
        self.clock_period_ns
    }

    fn delay_us(&mut self, us: u32) {
        self.delayed_us += u64::from(us);
    }
}
