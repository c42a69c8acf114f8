//! Bootloader identification
//!
//! The boot block sits at the top of program memory. Its size comes from
//! the chip's base boot size and the BOOTSZ fuse bits. The whole block is
//! streamed through MD5 and the digest looked up in a catalog of known
//! images.

mod fingerprint;
mod identify;
mod known;

#[cfg(feature = "std")]
mod database;

pub use fingerprint::{Fingerprint, ParseFingerprintError, RegionHasher};
pub use identify::*;
pub use known::{KnownImage, KNOWN_IMAGES};

#[cfg(feature = "std")]
pub use database::*;
