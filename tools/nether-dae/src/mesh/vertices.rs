//! Vertex attribute extraction.
//!
//! Walks the deduplicated tuple list and materializes per-vertex arrays by
//! re-reading the attribute streams through each tuple's raw indices. The
//! same walk serves two purposes: appending a geometry's vertices to the
//! output arrays, and overlaying a morph target's values over the window
//! appended by the base geometry.

use anyhow::Result;
use glam::Vec3;
use zx_common::pack_color_rgba_unorm8;

use crate::dom::{InputRef, Mesh, PrimitiveElem};
use crate::mesh::primitives::PrimitiveData;
use crate::mesh::streams::{classify_inputs, MeshStreams};
use crate::mesh::types::{ImportOptions, UvTransform, VertexArrays};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Grow the arrays by one entry per tuple and fill them.
    Append,
    /// Rewrite the trailing tuple-sized window in place. Optional arrays
    /// are only written where the base pass allocated them.
    Overlay,
}

/// Materialize vertex attributes for every tuple in `data`, reading streams
/// from `mesh`. In overlay mode `mesh` may be a different geometry than the
/// tuples were built from, as long as its primitive elements line up.
pub fn extract_vertex_data(
    mesh: &Mesh,
    name: &str,
    data: &PrimitiveData,
    mode: ExtractMode,
    arrays: &mut VertexArrays,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
) -> Result<()> {
    let tuples = &data.vert_tuples;
    let n = tuples.len();

    let base = match mode {
        ExtractMode::Append => {
            let old = arrays.points.len();
            arrays.points.resize(old + n, [0.0; 3]);
            arrays.uvs.resize(old + n, [0.0; 2]);
            old
        }
        ExtractMode::Overlay => {
            anyhow::ensure!(
                arrays.points.len() >= n,
                "Failed to get vertex data for '{}': vertex arrays are smaller than the tuple list",
                name
            );
            arrays.points.len() - n
        }
    };

    let elems: Vec<PrimitiveElem> = mesh
        .primitive_elems()
        .collect();

    // Tuples are grouped by source element, so streams are rebuilt once per
    // run instead of once per vertex.
    let mut i = 0;
    while i < n {
        let prim = tuples[i].prim;
        let end = tuples[i..]
            .iter()
            .position(|t| t.prim != prim)
            .map_or(n, |p| i + p);

        let Some(elem) = elems.get(prim) else {
            anyhow::bail!(
                "Failed to get vertex data for '{}': primitives do not match the base geometry",
                name
            );
        };
        let classified = classify_inputs(
            elem.inputs().iter().map(InputRef::Shared),
            mesh.vertices.as_ref(),
        );
        let streams = MeshStreams::read_inputs(&classified, mesh);
        let material = data.element_materials.get(prim).copied().flatten();

        for (k, tuple) in tuples[i..end].iter().enumerate() {
            let out = base + i + k;

            // In overlay mode an unreadable attribute leaves the base value
            // in place instead of writing a default.
            match streams.positions.as_ref().and_then(|r| r.read_vec3(tuple.vertex)) {
                Some(mut point) => {
                    if options.mirrored {
                        point[2] = -point[2];
                    }
                    arrays.points[out] = options
                        .object_offset
                        .transform_point3(Vec3::from_array(point))
                        .to_array();
                }
                None if mode == ExtractMode::Append => arrays.points[out] = [0.0; 3],
                None => {}
            }

            match streams.uvs.as_ref().and_then(|r| r.read_vec2(tuple.uv)) {
                Some(mut uv) => {
                    if let Some(t) = uv_transform {
                        uv = t.apply(material, uv, options.time);
                    }
                    arrays.uvs[out] = [uv[0], 1.0 - uv[1]];
                }
                None if mode == ExtractMode::Append => arrays.uvs[out] = [0.0, 0.0],
                None => {}
            }

            if mode == ExtractMode::Append && tuple.normal >= 0 && arrays.normals.is_none() {
                arrays.normals = Some(vec![[0.0, 0.0, 1.0]; arrays.points.len()]);
            }
            if let Some(normals) = &mut arrays.normals {
                if tuple.normal >= 0 {
                    match streams.normals.as_ref().and_then(|r| r.read_vec3(tuple.normal)) {
                        Some(mut normal) => {
                            if options.mirrored {
                                normal[2] = -normal[2];
                            }
                            normals[out] = normal;
                        }
                        None if mode == ExtractMode::Append => normals[out] = [0.0, 0.0, 1.0],
                        None => {}
                    }
                }
            }

            if mode == ExtractMode::Append && tuple.color >= 0 && arrays.colors.is_none() {
                arrays.colors = Some(vec![[255; 4]; arrays.points.len()]);
            }
            if let Some(colors) = &mut arrays.colors {
                if tuple.color >= 0 {
                    match streams.colors.as_ref().and_then(|r| r.read_color(tuple.color)) {
                        Some(c) => colors[out] = pack_color_rgba_unorm8(c[0], c[1], c[2], c[3]),
                        None if mode == ExtractMode::Append => colors[out] = [255; 4],
                        None => {}
                    }
                }
            }

            if mode == ExtractMode::Append && tuple.uv2 >= 0 && arrays.uv2s.is_none() {
                arrays.uv2s = Some(vec![[0.0; 2]; arrays.points.len()]);
            }
            if let Some(uv2s) = &mut arrays.uv2s {
                if tuple.uv2 >= 0 {
                    match streams.uv2s.as_ref().and_then(|r| r.read_vec2(tuple.uv2)) {
                        Some(mut uv) => {
                            if let Some(t) = uv_transform {
                                uv = t.apply(material, uv, options.time);
                            }
                            uv2s[out] = [uv[0], 1.0 - uv[1]];
                        }
                        None if mode == ExtractMode::Append => uv2s[out] = [0.0, 0.0],
                        None => {}
                    }
                }
            }
        }

        i = end;
    }

    Ok(())
}
