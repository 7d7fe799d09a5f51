//! NetherZXSkeleton binary format (.nczxskel)
//!
//! ZX console skeleton format containing inverse bind matrices for skeletal animation.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: bone_count u32
//! 0x04: reserved u32 (future: bone hierarchy)
//! 0x08: inverse_bind_matrices (bone_count × 48 bytes, 3×4 row-major)
//! ```
//!
//! Each inverse bind matrix is stored as 12 floats in row-major order,
//! matching `nethercore_shared::BoneMatrix3x4::to_array`:
//! [r0.x, r0.y, r0.z, tx, r1.x, r1.y, r1.z, ty, r2.x, r2.y, r2.z, tz]

/// NetherZXSkeleton header (8 bytes)
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct NetherZXSkeletonHeader {
    /// Number of bones in the skeleton
    pub bone_count: u32,
    /// Reserved for future use (bone hierarchy, etc.)
    pub reserved: u32,
}

impl NetherZXSkeletonHeader {
    pub const SIZE: usize = 8;

    pub fn new(bone_count: u32) -> Self {
        Self {
            bone_count,
            reserved: 0,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.bone_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            bone_count: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            reserved: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

/// Size of one inverse bind matrix in bytes (12 floats × 4 bytes = 48)
pub const INVERSE_BIND_MATRIX_SIZE: usize = 48;
