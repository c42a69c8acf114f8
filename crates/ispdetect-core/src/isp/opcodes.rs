//! AVR serial programming instruction bytes
//!
//! Every instruction is four bytes. Names follow the AVR datasheets'
//! "Serial Programming Instruction Set" tables.

/// Programming Enable (`AC 53 00 00`)
pub const PROGRAM_ENABLE: u8 = 0xAC;
/// Second byte of Programming Enable, echoed back as the third response byte
pub const PROGRAM_ACK: u8 = 0x53;

/// Read Signature Byte (`30 00 <index> 00`)
pub const READ_SIGNATURE: u8 = 0x30;
/// Read Calibration Byte (`38 00 00 00`)
pub const READ_CALIBRATION: u8 = 0x38;

/// Read Fuse Low Bits (`50 00 00 00`)
pub const READ_LOW_FUSE: u8 = 0x50;
/// Second byte of Read Fuse Low Bits
pub const READ_LOW_FUSE_ARG: u8 = 0x00;
/// Read Extended Fuse Bits (`50 08 00 00`)
pub const READ_EXT_FUSE: u8 = 0x50;
/// Second byte of Read Extended Fuse Bits
pub const READ_EXT_FUSE_ARG: u8 = 0x08;
/// Read Fuse High Bits (`58 08 00 00`)
pub const READ_HIGH_FUSE: u8 = 0x58;
/// Second byte of Read Fuse High Bits
pub const READ_HIGH_FUSE_ARG: u8 = 0x08;
/// Read Lock Bits (`58 00 00 00`)
pub const READ_LOCK: u8 = 0x58;
/// Second byte of Read Lock Bits
pub const READ_LOCK_ARG: u8 = 0x00;

/// Read Program Memory, low byte of the word (`20 <addr hi> <addr lo> 00`)
pub const READ_PROGRAM_MEMORY: u8 = 0x20;
/// OR-ed into [`READ_PROGRAM_MEMORY`] to select the high byte of the word
pub const READ_HIGH_BYTE: u8 = 0x08;
/// Load Extended Address Byte (`4D 00 <ext> 00`)
pub const LOAD_EXTENDED_ADDRESS: u8 = 0x4D;

/// Value of an erased flash byte
pub const ERASED: u8 = 0xFF;
