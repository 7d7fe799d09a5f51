//! Binary format definitions for Nethercore ZX asset files
//!
//! Re-exports from zx-common for writing asset files.

pub use zx_common::formats::*;

use anyhow::Result;
use std::io::Write;

use nethercore_shared::BoneMatrix3x4;

use crate::mesh::ConvertedMesh;

/// Write a complete NetherMesh file
///
/// Layout: header, packed vertex data, u16 little-endian indices, then the
/// surface table. Index data alignment for GPU upload is handled at runtime,
/// which keeps mesh files compact.
pub fn write_nether_mesh<W: Write>(w: &mut W, mesh: &ConvertedMesh) -> Result<()> {
    let header = NetherZXMeshHeader::new(
        mesh.vertex_count,
        mesh.index_count,
        mesh.format,
        mesh.surfaces.len() as u8,
    );
    w.write_all(&header.to_bytes())?;
    w.write_all(&mesh.vertex_data)?;

    for i in &mesh.indices {
        w.write_all(&i.to_le_bytes())?;
    }

    for surface in &mesh.surfaces {
        w.write_all(&surface.to_bytes())?;
    }

    Ok(())
}

/// Write a complete NetherSkeleton file
///
/// Matrices are stored as 12 floats per bone (3x4 row-major), matching
/// `BoneMatrix3x4::to_array`.
pub fn write_nether_skeleton<W: Write>(w: &mut W, matrices: &[BoneMatrix3x4]) -> Result<()> {
    let header = NetherZXSkeletonHeader::new(matrices.len() as u32);
    w.write_all(&header.to_bytes())?;

    for matrix in matrices {
        for f in matrix.to_array() {
            w.write_all(&f.to_le_bytes())?;
        }
    }

    Ok(())
}
