//! AVR chip profiles and catalog
//!
//! This module provides the profile type describing one AVR variant and
//! the compiled-in catalog of known variants, keyed by device signature.

mod catalog;
pub mod layouts;
mod types;

pub use catalog::{find_by_name, find_by_signature, find_in, CHIPS};
pub use types::*;
