//! Fuse and lock byte decoding
//!
//! Every chip variant describes its fuse bits with a [`FuseLayout`], an
//! ordered table of [`FuseFieldDescriptor`]s. A single generic decoder
//! walks that table against the raw bytes read from the target; there is
//! no per-chip code anywhere in this module.
//!
//! Fuse cells are inverted: a bit reads as `0` when it is programmed. A
//! single on/off field is therefore reported as set when all bits under
//! its mask are zero.

mod decode;
mod interpret;
mod types;

pub use decode::{decode, decode_field, decode_layout, DecodedField, FieldDecoder};
pub use interpret::{FieldValue, Interpreter, RESERVED};
pub(crate) use interpret::boot_multiplier;
pub use types::*;
