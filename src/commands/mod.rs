//! CLI command implementations
//!
//! Every command that talks to hardware opens one programmer, drives one
//! ISP session and tears it down before returning. Nothing is ever
//! written to the target.
//!
//! ## Offline commands
//!
//! `decode` and `fingerprint` work without a programmer: they run the
//! fuse decoder and the digest on values and files given by the user.

pub mod decode;
pub mod detect;
pub mod dump;
pub mod fingerprint;
mod list;
mod progress;
mod report;

pub use list::{list_bootloaders, list_chips, list_programmers};
