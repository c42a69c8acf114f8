//! AVR serial programming read commands
//!
//! Every function here is a fixed sequence of [`IspSession::execute`]
//! calls. Nothing is interpreted: decoding lives in [`crate::fuse`].

use crate::chip::{self, ChipProfile, Signature};
use crate::error::Result;
use crate::fuse::{FuseByte, RawFuseBytes};
use crate::isp::{opcodes, IspSession};
use crate::programmer::IspMaster;

/// Read the three device signature bytes
pub fn read_signature<M: IspMaster>(session: &mut IspSession<M>) -> Result<[u8; 3]> {
    let mut sig = [0u8; 3];
    for (i, byte) in sig.iter_mut().enumerate() {
        *byte = session.execute(opcodes::READ_SIGNATURE, 0x00, i as u8, 0x00)?;
    }
    log::debug!(
        "avr: signature {:02X} {:02X} {:02X}",
        sig[0],
        sig[1],
        sig[2]
    );
    Ok(sig)
}

/// Read the signature and resolve it against a catalog
///
/// An unknown signature is not an error; the profile is then `None`.
pub fn identify<'c, M: IspMaster>(
    session: &mut IspSession<M>,
    catalog: &'c [ChipProfile],
) -> Result<(Signature, Option<&'c ChipProfile>)> {
    let sig = Signature(read_signature(session)?);
    let found = chip::find_in(catalog, sig.0);
    match found {
        Some(profile) => log::info!("avr: found {} ({} bytes flash)", profile.name, profile.flash_size),
        None if !sig.is_plausible() => {
            log::warn!("avr: signature {} suggests no target is connected", sig)
        }
        None => log::warn!("avr: unrecognized signature {}", sig),
    }
    Ok((sig, found))
}

/// Read a single fuse byte
pub fn read_fuse<M: IspMaster>(session: &mut IspSession<M>, byte: FuseByte) -> Result<u8> {
    let (op, arg) = match byte {
        FuseByte::Low => (opcodes::READ_LOW_FUSE, opcodes::READ_LOW_FUSE_ARG),
        FuseByte::High => (opcodes::READ_HIGH_FUSE, opcodes::READ_HIGH_FUSE_ARG),
        FuseByte::Extended => (opcodes::READ_EXT_FUSE, opcodes::READ_EXT_FUSE_ARG),
        FuseByte::Lock => (opcodes::READ_LOCK, opcodes::READ_LOCK_ARG),
    };
    session.execute(op, arg, 0x00, 0x00)
}

/// Read the oscillator calibration byte
pub fn read_calibration<M: IspMaster>(session: &mut IspSession<M>) -> Result<u8> {
    session.execute(opcodes::READ_CALIBRATION, 0x00, 0x00, 0x00)
}

/// Read all fuse, lock and calibration bytes
pub fn read_fuses<M: IspMaster>(session: &mut IspSession<M>) -> Result<RawFuseBytes> {
    let low = read_fuse(session, FuseByte::Low)?;
    let high = read_fuse(session, FuseByte::High)?;
    let extended = read_fuse(session, FuseByte::Extended)?;
    let lock = read_fuse(session, FuseByte::Lock)?;
    let calibration = read_calibration(session)?;

    log::debug!(
        "avr: lfuse 0x{:02X} hfuse 0x{:02X} efuse 0x{:02X} lock 0x{:02X} cal 0x{:02X}",
        low,
        high,
        extended,
        lock,
        calibration
    );

    Ok(RawFuseBytes::new(low, high, extended, lock, calibration))
}
