//! Program memory reader
//!
//! Program memory is word-addressed on the wire. A byte address splits
//! into a word address (`address >> 1`) and a high/low byte selector
//! (`address & 1`). Word addresses above 16 bits need the extended address
//! byte, which the session caches so it is only reloaded on change.

use crate::chip::ChipProfile;
use crate::error::{Error, Result};
use crate::isp::{opcodes, IspSession};
use crate::programmer::IspMaster;

/// Extended address byte for a byte address
pub const fn extended_byte(address: u32) -> u8 {
    (address >> 17) as u8
}

/// Random-access reader over the target's program memory
pub struct MemoryReader<'s, M: IspMaster> {
    session: &'s mut IspSession<M>,
    limit: Option<u32>,
    reloads: u32,
}

impl<'s, M: IspMaster> MemoryReader<'s, M> {
    /// Create a reader with no address bound
    ///
    /// Used when the chip is unknown. Addresses past the end of the real
    /// memory wrap or read as garbage, depending on the part.
    pub fn new(session: &'s mut IspSession<M>) -> Self {
        Self {
            session,
            limit: None,
            reloads: 0,
        }
    }

    /// Create a reader bounded by a chip's program memory size
    pub fn for_chip(session: &'s mut IspSession<M>, profile: &ChipProfile) -> Self {
        Self {
            session,
            limit: Some(profile.flash_size),
            reloads: 0,
        }
    }

    /// Address bound, if any
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Number of extended address loads issued by this reader
    pub fn extended_reloads(&self) -> u32 {
        self.reloads
    }

    /// Read one byte
    pub fn read_byte(&mut self, address: u32) -> Result<u8> {
        if self.limit.is_some_and(|limit| address >= limit) {
            return Err(Error::AddressOutOfBounds);
        }

        let ext = extended_byte(address);
        if ext != self.session.loaded_extended_address() {
            log::trace!("memory: loading extended address 0x{:02X}", ext);
            self.session
                .execute(opcodes::LOAD_EXTENDED_ADDRESS, 0x00, ext, 0x00)?;
            self.session.set_loaded_extended_address(ext);
            self.reloads += 1;
        }

        let word = address >> 1;
        let op = if address & 1 != 0 {
            opcodes::READ_PROGRAM_MEMORY | opcodes::READ_HIGH_BYTE
        } else {
            opcodes::READ_PROGRAM_MEMORY
        };
        self.session
            .execute(op, (word >> 8) as u8, word as u8, 0x00)
    }

    /// Fill `buf` with consecutive bytes starting at `address`
    ///
    /// The range must end at or below the reader's limit, or at the top
    /// of the 32-bit address space for unbounded readers.
    pub fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        let end = u64::from(address) + buf.len() as u64;
        let limit = self.limit.map_or(1u64 << 32, u64::from);
        if end > limit {
            return Err(Error::AddressOutOfBounds);
        }

        for (offset, slot) in buf.iter_mut().enumerate() {
            let addr = address
                .checked_add(offset as u32)
                .ok_or(Error::AddressOutOfBounds)?;
            *slot = self.read_byte(addr)?;
        }
        Ok(())
    }
}
