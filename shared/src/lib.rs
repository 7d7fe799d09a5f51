//! Shared types for the Nethercore fantasy console platform.
//!
//! This crate provides platform-wide definitions shared between the console
//! runtimes and the asset pipeline tools:
//!
//! - [`math`] - POD math types that serialize without pulling in glam
//! - [`rom_format`] - ROM and asset file format constants per console
//!
//! Everything here must stay dependency-light; console implementations and
//! tools layer their own math/IO stacks on top.

pub mod math;
pub mod rom_format;

pub use math::BoneMatrix3x4;
pub use rom_format::{RomFormat, ZX_ROM_FORMAT};
