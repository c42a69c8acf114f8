//! Error types for ispdetect-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate. Only bus and session failures are errors; every
//! decode-time oddity (unknown signature, reserved bit pattern, unknown
//! bootloader) is reported as an outcome value instead.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// A byte exchange on the ISP bus failed
    TransferFailed,
    /// The programmer could not acquire or drive its lines
    ProgrammerError,

    // Session errors
    /// The target never acknowledged Programming Enable
    ProgrammingModeFailed {
        /// Number of handshake attempts made before giving up
        attempts: u8,
    },
    /// A command was issued before the session reached `Ready`
    SessionNotReady,

    // Address errors
    /// Address is beyond the bound chip's program memory
    AddressOutOfBounds,

    // I/O errors
    /// I/O error occurred
    IoError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransferFailed => write!(f, "ISP bus transfer failed"),
            Self::ProgrammerError => write!(f, "programmer error"),
            Self::ProgrammingModeFailed { attempts } => write!(
                f,
                "failed to enter programming mode after {} attempts, double-check wiring",
                attempts
            ),
            Self::SessionNotReady => write!(f, "ISP session is not in programming mode"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
