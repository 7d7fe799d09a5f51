//! NetherZXMesh binary format (.nczxmesh)
//!
//! ZX console GPU-ready mesh format with packed vertices.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: index_count u32
//! 0x08: format u8 (vertex format flags)
//! 0x09: surface_count u8
//! 0x0A: padding (2 bytes)
//! 0x0C: vertex_data (vertex_count * stride)
//! var:  index_data (index_count * 2 bytes), if indexed
//! var:  surface_table (surface_count * 16 bytes)
//! ```
//!
//! Indices are 16-bit. A mesh with more than 65536 vertices is split into
//! surfaces; each surface carries a `base_vertex` that is added to its
//! indices at draw time. `surface_count == 0` means the whole index range
//! is one surface with `base_vertex = 0`.
//!
//! For vertex format constants and stride calculation, see `zx_common::packing`.

/// NetherZXMesh header (12 bytes)
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct NetherZXMeshHeader {
    pub vertex_count: u32,
    pub index_count: u32,
    pub format: u8,
    pub surface_count: u8,
    pub _padding: [u8; 2],
}

impl NetherZXMeshHeader {
    pub const SIZE: usize = 12;

    pub fn new(vertex_count: u32, index_count: u32, format: u8, surface_count: u8) -> Self {
        Self {
            vertex_count,
            index_count,
            format,
            surface_count,
            _padding: [0; 2],
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[8] = self.format;
        bytes[9] = self.surface_count;
        // padding bytes stay 0
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            vertex_count: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            index_count: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            format: bytes[8],
            surface_count: bytes[9],
            _padding: [0; 2],
        })
    }
}

/// One entry in the surface table (16 bytes)
///
/// Describes a contiguous index range drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MeshSurface {
    /// First index in the range
    pub start: u32,
    /// Number of indices in the range
    pub count: u32,
    /// Added to every 16-bit index in this range at draw time
    pub base_vertex: u32,
    /// Material slot for this range
    pub material: u32,
}

impl MeshSurface {
    pub const SIZE: usize = 16;

    /// Write surface entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.start.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.count.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.base_vertex.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.material.to_le_bytes());
        bytes
    }

    /// Read surface entry from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            start: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            count: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            base_vertex: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            material: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }
}
