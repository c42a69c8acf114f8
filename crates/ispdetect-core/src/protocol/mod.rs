//! Protocol implementations
//!
//! This module contains the AVR serial programming command sequences used
//! to identify a chip and read its configuration.

mod avr;

pub use avr::*;
