//! Primitive construction: interleaved corner indices in, deduplicated
//! vertex tuples plus an index list out.
//!
//! Output vertices are grouped into 65536-wide blocks so indices can be
//! stored 16 bits wide with a per-surface base vertex. Tuples never
//! straddle a block: before a triangle that would cross the boundary, the
//! tuple list is padded up to the block edge and deduplication starts
//! over in the new block.

use std::hash::{Hash, Hasher};

use hashbrown::HashMap;
use zx_common::pack_color_rgba_unorm8;

use crate::dom::{InputRef, Mesh, PrimitiveElem};
use crate::mesh::streams::{
    classify_inputs, MeshStreams, SLOT_COLOR, SLOT_NORMAL, SLOT_POSITION, SLOT_UV, SLOT_UV2,
};
use crate::mesh::types::{DrawPrimitive, PRIM_INDEXED, PRIM_MATERIAL_MASK, PRIM_NO_MATERIAL, PRIM_TRIANGLES};

/// Attribute values materialized at tuple creation, stored as raw bits so
/// equality is exact. Missing attributes read as max-representable
/// sentinels, which cannot collide with real data from a resolved stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TupleData {
    point: [u32; 3],
    normal: [u32; 3],
    color: [u8; 4],
    uv: [u32; 2],
    uv2: [u32; 2],
}

impl Default for TupleData {
    fn default() -> Self {
        Self {
            point: [f32::MAX.to_bits(); 3],
            normal: [f32::MAX.to_bits(); 3],
            color: [255; 4],
            uv: [f32::MAX.to_bits(); 2],
            uv2: [f32::MAX.to_bits(); 2],
        }
    }
}

fn bits3(v: Option<[f32; 3]>) -> [u32; 3] {
    let v = v.unwrap_or([f32::MAX; 3]);
    [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()]
}

fn bits2(v: Option<[f32; 2]>) -> [u32; 2] {
    let v = v.unwrap_or([f32::MAX; 2]);
    [v[0].to_bits(), v[1].to_bits()]
}

impl TupleData {
    fn capture(
        streams: &MeshStreams,
        vertex: i32,
        normal: i32,
        color: i32,
        uv: i32,
        uv2: i32,
    ) -> Self {
        Self {
            point: bits3(streams.positions.as_ref().and_then(|r| r.read_vec3(vertex))),
            normal: bits3(streams.normals.as_ref().and_then(|r| r.read_vec3(normal))),
            color: streams
                .colors
                .as_ref()
                .and_then(|r| r.read_color(color))
                .map(|c| pack_color_rgba_unorm8(c[0], c[1], c[2], c[3]))
                .unwrap_or([255; 4]),
            uv: bits2(streams.uvs.as_ref().and_then(|r| r.read_vec2(uv))),
            uv2: bits2(streams.uv2s.as_ref().and_then(|r| r.read_vec2(uv2))),
        }
    }
}

/// One unique output vertex: the raw attribute indices it was built from,
/// plus the values they resolved to.
///
/// Two tuples are the same vertex when they share a raw position index and
/// every materialized value matches; the raw secondary indices may differ
/// as long as they point at identical data. Hashing uses the position index
/// alone, consistent with that equality.
#[derive(Debug, Clone, Copy)]
pub struct VertTuple {
    /// Index of the primitive element this tuple was first built from.
    pub prim: usize,
    pub vertex: i32,
    pub normal: i32,
    pub color: i32,
    pub uv: i32,
    pub uv2: i32,
    data: TupleData,
}

impl PartialEq for VertTuple {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex && self.data == other.data
    }
}

impl Eq for VertTuple {}

impl Hash for VertTuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vertex.hash(state);
    }
}

/// Result of primitive construction for one mesh.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveData {
    pub vert_tuples: Vec<VertTuple>,
    pub indices: Vec<u32>,
    pub primitives: Vec<DrawPrimitive>,
    /// Material registry index per source primitive element, aligned with
    /// `VertTuple::prim`. `None` for untagged or skipped elements.
    pub element_materials: Vec<Option<u32>>,
}

/// Corner positions (in index-group units) of each triangle in an element.
/// Polylists are fan triangulated; truncated index streams clip the
/// triangle count rather than reading out of range.
fn triangle_corners(elem: &PrimitiveElem, stride: usize) -> Vec<[usize; 3]> {
    let total = elem.indices().len() / stride;
    match elem {
        PrimitiveElem::Triangles(t) => {
            let count = (t.count as usize).min(total / 3);
            (0..count).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect()
        }
        PrimitiveElem::Polylist(poly) => {
            let mut corners = Vec::new();
            let mut base = 0usize;
            for &n in &poly.vcount {
                let n = n as usize;
                if base + n > total {
                    break;
                }
                for k in 1..n.saturating_sub(1) {
                    corners.push([base, base + k, base + k + 1]);
                }
                base += n;
            }
            corners
        }
    }
}

/// Build the deduplicated vertex tuple list, index list, and draw
/// primitives for every supported element of `mesh`.
///
/// `material_tag` maps an element's material symbol to a full primitive
/// tag; it is invoked once per element that produces triangles. Triangle
/// winding is reversed relative to the document unless `mirrored` is set,
/// which flips it back.
pub fn build_primitives(
    mesh: &Mesh,
    mesh_name: &str,
    mirrored: bool,
    mut material_tag: impl FnMut(Option<&str>) -> u32,
) -> PrimitiveData {
    for (kind, n) in mesh.unsupported_kinds() {
        tracing::warn!(
            "Mesh '{}' contains {} <{}> element(s); only triangles and polylists are converted",
            mesh_name,
            n,
            kind
        );
    }

    let mut out = PrimitiveData::default();
    let mut tuple_map: HashMap<VertTuple, u32> = HashMap::new();
    let mut warned_split = false;

    for (elem_index, elem) in mesh.primitive_elems().enumerate() {
        let classified = classify_inputs(
            elem.inputs().iter().map(InputRef::Shared),
            mesh.vertices.as_ref(),
        );
        let stride = classified.stride();
        let corners = triangle_corners(&elem, stride);
        if corners.is_empty() {
            out.element_materials.push(None);
            continue;
        }

        let tag = material_tag(elem.material());
        out.element_materials.push(if tag & PRIM_NO_MATERIAL != 0 {
            None
        } else {
            Some(tag & PRIM_MATERIAL_MASK)
        });

        let streams = MeshStreams::read_inputs(&classified, mesh);
        let p = elem.indices();
        let offsets = [
            classified.offset(SLOT_POSITION),
            classified.offset(SLOT_NORMAL),
            classified.offset(SLOT_COLOR),
            classified.offset(SLOT_UV),
            classified.offset(SLOT_UV2),
        ];
        let read_index = |pos: usize, offset: Option<u32>| -> i32 {
            match offset {
                Some(off) => p
                    .get(pos * stride + off as usize)
                    .map(|&v| v as i32)
                    .unwrap_or(-1),
                None => -1,
            }
        };

        let mut prim = DrawPrimitive {
            start: out.indices.len() as u32,
            num_elements: 0,
            mat_index: tag,
        };

        for (i_tri, tri) in corners.iter().enumerate() {
            // This triangle may add up to 3 tuples; if they could land on
            // both sides of a 65536 boundary, close out the current block
            // first.
            let len = out.vert_tuples.len();
            if len > 0 && (((len - 1) ^ (len + 2)) & 0x10000) != 0 {
                if let Some(last) = out.vert_tuples.last().copied() {
                    while out.vert_tuples.len() & 0xFFFF != 0 {
                        out.vert_tuples.push(last);
                    }
                }
                tuple_map.clear();
                if i_tri > 0 {
                    if !warned_split {
                        warned_split = true;
                        tracing::warn!(
                            "Mesh '{}' needs more than 65536 vertices in one primitive; splitting the draw call",
                            mesh_name
                        );
                    }
                    out.primitives.push(prim);
                    prim = DrawPrimitive {
                        start: out.indices.len() as u32,
                        num_elements: 0,
                        mat_index: tag,
                    };
                }
            }

            for v in 0..3 {
                let corner = tri[if mirrored { v } else { 2 - v }];
                let vertex = read_index(corner, offsets[0]);
                let normal = read_index(corner, offsets[1]);
                let color = read_index(corner, offsets[2]);
                let uv = read_index(corner, offsets[3]);
                let uv2 = read_index(corner, offsets[4]);
                let tuple = VertTuple {
                    prim: elem_index,
                    vertex,
                    normal,
                    color,
                    uv,
                    uv2,
                    data: TupleData::capture(&streams, vertex, normal, color, uv, uv2),
                };

                let next = out.vert_tuples.len() as u32;
                let index = *tuple_map.entry(tuple).or_insert_with(|| {
                    out.vert_tuples.push(tuple);
                    next
                });
                out.indices.push(index);
            }
            prim.num_elements += 3;
        }

        out.primitives.push(prim);
    }

    out
}

/// The standard tag for a converted element: indexed triangles plus either
/// a material index or the no-material flag.
pub fn primitive_tag(material_index: Option<u32>) -> u32 {
    match material_index {
        Some(index) => PRIM_TRIANGLES | PRIM_INDEXED | (index & PRIM_MATERIAL_MASK),
        None => PRIM_TRIANGLES | PRIM_INDEXED | PRIM_NO_MATERIAL,
    }
}
