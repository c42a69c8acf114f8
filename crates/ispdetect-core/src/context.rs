//! Per-session target state
//!
//! A [`TargetContext`] holds what has been learned about the chip on the
//! other end of a session: its signature, the matching catalog profile if
//! there is one, and its configuration bytes. It replaces any notion of a
//! global "current chip".

use crate::chip::{ChipProfile, Signature};
use crate::error::Result;
use crate::fuse::{self, FieldDecoder, RawFuseBytes};
use crate::isp::IspSession;
use crate::memory::MemoryReader;
use crate::programmer::IspMaster;
use crate::protocol;

/// What is known about the attached target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetContext<'c> {
    /// Signature read from the chip
    pub signature: Signature,
    /// Matching profile, `None` for unrecognized signatures
    pub profile: Option<&'c ChipProfile>,
    /// Fuse, lock and calibration bytes
    pub fuses: RawFuseBytes,
}

impl<'c> TargetContext<'c> {
    /// Chip name, or "unknown"
    pub fn name(&self) -> &'c str {
        self.profile.map_or("unknown", |p| p.name)
    }

    /// Whether the signature matched a catalog entry
    pub fn is_known(&self) -> bool {
        self.profile.is_some()
    }

    /// Decode the fuses with the profile's layout
    ///
    /// `None` if the chip is unknown or has no fuse information.
    pub fn decode_fuses(&self) -> Option<FieldDecoder<'static>> {
        self.profile.and_then(|p| fuse::decode(p, &self.fuses))
    }

    /// Program memory reader, bounded by the profile when there is one
    pub fn memory_reader<'s, M: IspMaster>(
        &self,
        session: &'s mut IspSession<M>,
    ) -> MemoryReader<'s, M> {
        match self.profile {
            Some(profile) => MemoryReader::for_chip(session, profile),
            None => MemoryReader::new(session),
        }
    }
}

/// Identify the chip on a ready session and read its configuration
///
/// An unknown signature still reads the fuses.
pub fn probe<'c, M: IspMaster>(
    session: &mut IspSession<M>,
    catalog: &'c [ChipProfile],
) -> Result<TargetContext<'c>> {
    let (signature, profile) = protocol::identify(session, catalog)?;
    let fuses = protocol::read_fuses(session)?;

    Ok(TargetContext {
        signature,
        profile,
        fuses,
    })
}
