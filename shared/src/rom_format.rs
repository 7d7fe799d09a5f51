//! ROM format specifications for Nethercore fantasy consoles.
//!
//! This module defines the `RomFormat` struct which serves as the single source of truth
//! for all ROM-related constants (file extensions, magic bytes, asset extensions).
//!
//! # Example
//!
//! ```
//! use nethercore_shared::ZX_ROM_FORMAT;
//!
//! // Get the ROM file extension
//! assert_eq!(ZX_ROM_FORMAT.extension, "nczx");
//!
//! // Check magic bytes
//! assert_eq!(ZX_ROM_FORMAT.magic, b"NCZX");
//!
//! // Get asset extensions
//! assert_eq!(ZX_ROM_FORMAT.mesh_ext, "nczxmesh");
//! ```

/// ROM format specification for a fantasy console.
///
/// Defines the file format constants used for ROM files and assets.
/// Each console has its own static `RomFormat` instance.
#[derive(Debug, Clone, Copy)]
pub struct RomFormat {
    /// ROM file extension without dot (e.g., "nczx")
    pub extension: &'static str,

    /// Magic bytes at start of ROM file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version for backward compatibility
    pub version: u32,

    /// Mesh file extension (e.g., "nczxmesh")
    pub mesh_ext: &'static str,

    /// Texture file extension (e.g., "nczxtex")
    pub texture_ext: &'static str,

    /// Sound file extension (e.g., "nczxsnd")
    pub sound_ext: &'static str,

    /// Skeleton file extension (e.g., "nczxskel")
    pub skeleton_ext: &'static str,

    /// Animation file extension (e.g., "nczxanim")
    pub animation_ext: &'static str,
}

impl RomFormat {
    /// Create a new ROM format specification.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        extension: &'static str,
        magic: &'static [u8; 4],
        version: u32,
        mesh_ext: &'static str,
        texture_ext: &'static str,
        sound_ext: &'static str,
        skeleton_ext: &'static str,
        animation_ext: &'static str,
    ) -> Self {
        Self {
            extension,
            magic,
            version,
            mesh_ext,
            texture_ext,
            sound_ext,
            skeleton_ext,
            animation_ext,
        }
    }
}

/// Nethercore ZX ROM format specification.
///
/// This is the single source of truth for all ZX ROM format constants:
/// - ROM extension: `.nczx`
/// - Magic bytes: `NCZX`
/// - Asset extensions: `.nczxmesh`, `.nczxtex`, `.nczxsnd`, `.nczxskel`, `.nczxanim`
pub const ZX_ROM_FORMAT: RomFormat = RomFormat::new(
    "nczx",
    b"NCZX",
    1,
    "nczxmesh",
    "nczxtex",
    "nczxsnd",
    "nczxskel",
    "nczxanim",
);
