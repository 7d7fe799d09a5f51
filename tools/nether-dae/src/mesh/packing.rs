//! Packs imported meshes into the ZX GPU vertex layout.

use anyhow::{bail, Result};
use bytemuck::cast_slice;
use zx_common::MeshSurface;

use crate::{
    pack_bone_weights_unorm8, pack_normal_octahedral, pack_position_f16, pack_uv_unorm16,
    vertex_stride_packed, FORMAT_COLOR, FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_UV, FORMAT_UV2,
};

use super::types::{ConvertedMesh, MeshData, PRIM_NO_MATERIAL};

/// Pack a mesh into the ZX vertex buffer and surface table.
///
/// The vertex format is detected from the arrays the mesh actually carries
/// unless `format_override` replaces it. Attribute order within a vertex is
/// fixed by `vertex_stride_packed`: position, UV, UV2, color, normal,
/// skinning.
///
/// Stored indices keep only the low 16 bits of the global index; each
/// surface's `base_vertex` restores the 64K block base at draw time.
pub fn pack_mesh(mesh: &MeshData, format_override: Option<u8>) -> Result<ConvertedMesh> {
    let arrays = &mesh.vertices;
    let vertex_count = arrays.vertex_count();

    let mut format = FORMAT_UV;
    if arrays.normals.is_some() {
        format |= FORMAT_NORMAL;
    }
    if arrays.colors.is_some() {
        format |= FORMAT_COLOR;
    }
    if arrays.uv2s.is_some() {
        format |= FORMAT_UV2;
    }
    if mesh.skin.is_some() {
        format |= FORMAT_SKINNED;
    }
    let format = format_override.unwrap_or(format);

    let skinning = mesh
        .skin
        .as_ref()
        .map(|skin| skin.vertex_influences(vertex_count));

    let stride = vertex_stride_packed(format) as usize;
    let mut vertex_data = Vec::with_capacity(vertex_count * stride);

    for i in 0..vertex_count {
        // Position (f16x4) - 8 bytes
        let pos = arrays.points[i];
        let packed_pos = pack_position_f16(pos[0], pos[1], pos[2]);
        vertex_data.extend_from_slice(cast_slice(&packed_pos));

        // UV (unorm16x2) - 4 bytes
        if format & FORMAT_UV != 0 {
            let uv = arrays.uvs[i];
            let packed_uv = pack_uv_unorm16(uv[0], uv[1]);
            vertex_data.extend_from_slice(cast_slice(&packed_uv));
        }

        // Second UV channel (unorm16x2) - 4 bytes
        if format & FORMAT_UV2 != 0 {
            let uv = arrays.uv2s.as_ref().map(|u| u[i]).unwrap_or([0.0, 0.0]);
            let packed_uv = pack_uv_unorm16(uv[0], uv[1]);
            vertex_data.extend_from_slice(cast_slice(&packed_uv));
        }

        // Color (unorm8x4) - 4 bytes, already quantized at extraction
        if format & FORMAT_COLOR != 0 {
            let color = arrays.colors.as_ref().map(|c| c[i]).unwrap_or([255; 4]);
            vertex_data.extend_from_slice(&color);
        }

        // Normal (octahedral u32) - 4 bytes
        if format & FORMAT_NORMAL != 0 {
            let n = arrays
                .normals
                .as_ref()
                .map(|n| n[i])
                .unwrap_or([0.0, 0.0, 1.0]);
            let packed_normal = pack_normal_octahedral(n[0], n[1], n[2]);
            vertex_data.extend_from_slice(&packed_normal.to_le_bytes());
        }

        // Skinning (bone indices + weights) - 8 bytes
        if format & FORMAT_SKINNED != 0 {
            if let Some((bones, weights)) = &skinning {
                vertex_data.extend_from_slice(&bones[i]);
                vertex_data.extend_from_slice(&pack_bone_weights_unorm8(weights[i]));
            } else {
                // Format forced to skinned without skin data - bind
                // everything to bone 0
                vertex_data.extend_from_slice(&[0u8; 4]);
                vertex_data.extend_from_slice(&[255, 0, 0, 0]);
            }
        }
    }

    let indices: Vec<u16> = mesh.indices.iter().map(|&i| (i & 0xFFFF) as u16).collect();

    let mut surfaces = Vec::with_capacity(mesh.primitives.len());
    for prim in &mesh.primitives {
        let base_vertex = mesh
            .indices
            .get(prim.start as usize)
            .map_or(0, |&i| i & !0xFFFF);
        surfaces.push(MeshSurface {
            start: prim.start,
            count: prim.num_elements,
            base_vertex,
            material: prim.mat_index,
        });
    }

    if surfaces.len() > u8::MAX as usize {
        bail!(
            "Mesh '{}' has {} surfaces, the limit is {}",
            mesh.name,
            surfaces.len(),
            u8::MAX
        );
    }

    // A single untagged surface over block zero is the implicit default;
    // drop the record and let the header alone describe the mesh.
    let implicit = matches!(
        surfaces.as_slice(),
        [only] if only.start == 0 && only.base_vertex == 0 && only.material & PRIM_NO_MATERIAL != 0
    );
    if implicit {
        surfaces.clear();
    }

    Ok(ConvertedMesh {
        name: mesh.name.clone(),
        format,
        vertex_count: vertex_count as u32,
        index_count: indices.len() as u32,
        vertex_data,
        indices,
        surfaces,
    })
}

/// Parse a format override string such as "POS_UV_NORMAL".
pub(crate) fn parse_format_string(s: &str) -> Result<u8> {
    let mut format = 0u8;
    for token in s.to_uppercase().split('_') {
        match token {
            "" | "POS" | "POSITION" => {}
            "UV" => format |= FORMAT_UV,
            "UV2" => format |= FORMAT_UV2,
            "COLOR" => format |= FORMAT_COLOR,
            "NORMAL" => format |= FORMAT_NORMAL,
            "SKIN" | "SKINNED" => format |= FORMAT_SKINNED,
            other => bail!("Unknown vertex format component '{}'", other),
        }
    }
    Ok(format)
}
