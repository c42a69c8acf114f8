//! AVR ISP session layer
//!
//! This module brings a target into serial programming mode and exposes
//! the single four-byte command primitive everything else is built on.

pub mod opcodes;
mod session;

pub use session::{HandshakeConfig, IspSession, SessionState};
