//! Programmer traits and abstractions
//!
//! This module defines the traits a programmer backend implements to drive
//! the ISP bus of a target chip.

pub mod bitbang;
mod traits;

pub use bitbang::BitbangIspMaster;
pub use traits::*;
