//! Nethercore ZX binary asset formats
//!
//! These are POD (Plain Old Data) formats for GPU-ready assets.
//! No magic bytes - the format is determined by context (which FFI function is called).
//!
//! ROM format constants (extensions, magic bytes) are defined in `nethercore_shared::RomFormat`.
//! Use `ZX_ROM_FORMAT` for all ZX-specific format constants.
//!
//! All format headers implement the [`BinarySerializable`] trait for consistent
//! serialization/deserialization.

pub mod mesh;
mod serialization;
pub mod skeleton;

pub use mesh::*;
pub use serialization::BinarySerializable;
pub use skeleton::*;

// Re-export ROM format from shared for convenience
pub use nethercore_shared::{RomFormat, ZX_ROM_FORMAT};
