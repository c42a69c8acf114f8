//! ispdetect-core - Core library for AVR in-system-programming detection
//!
//! This crate identifies an AVR microcontroller attached to a synchronous
//! ISP bus, decodes its fuse and lock bytes and recognises the bootloader
//! stored in its boot block by MD5 fingerprint. It never writes to the
//! target. It is designed to be `no_std` compatible.
//!
//! # Features
//!
//! - `alloc` - Enable heap allocation for the [`detect`] report
//! - `std` - Enable standard library support (includes `alloc`) and the
//!   RON bootloader database
//!
//! # Example
//!
//! ```ignore
//! use ispdetect_core::isp::IspSession;
//! use ispdetect_core::{bootloader, chip, fuse, protocol};
//!
//! fn inspect<M: ispdetect_core::programmer::IspMaster>(master: M) {
//!     let mut session = IspSession::new(master);
//!     if session.establish().is_err() {
//!         println!("Target did not enter programming mode");
//!         return;
//!     }
//!
//!     if let Ok((_, Some(profile))) = protocol::identify(&mut session, chip::CHIPS) {
//!         let fuses = protocol::read_fuses(&mut session).unwrap();
//!         for field in fuse::decode(profile, &fuses).into_iter().flatten() {
//!             println!("{}: {}", field.label, field.value);
//!         }
//!     }
//!     session.teardown();
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bootloader;
pub mod chip;
pub mod context;
#[cfg(feature = "alloc")]
pub mod detect;
pub mod error;
pub mod fuse;
pub mod isp;
pub mod memory;
pub mod programmer;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
