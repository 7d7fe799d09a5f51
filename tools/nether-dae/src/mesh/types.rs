//! Core importer data types shared across the mesh pipeline.

use glam::Mat4;
use nethercore_shared::BoneMatrix3x4;
use zx_common::MeshSurface;

/// Hard cap on bone influences stored per vertex.
pub const MAX_WEIGHTS_PER_VERTEX: usize = 4;

/// Skeleton size limit imposed by the 8-bit bone indices in the vertex
/// stream.
pub const MAX_BONE_COUNT: usize = 256;

// Primitive tag bits. The low bits carry the material index, the high bits
// the primitive kind flags.
pub const PRIM_TRIANGLES: u32 = 1 << 30;
pub const PRIM_INDEXED: u32 = 1 << 29;
pub const PRIM_NO_MATERIAL: u32 = 1 << 28;
pub const PRIM_MATERIAL_MASK: u32 = (1 << 28) - 1;

/// One indexed triangle run: `num_elements` consecutive entries of the mesh
/// index list starting at `start`, all sharing one material tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPrimitive {
    pub start: u32,
    pub num_elements: u32,
    pub mat_index: u32,
}

impl DrawPrimitive {
    /// Material index carried in the tag, or `None` for untagged geometry.
    pub fn material(&self) -> Option<u32> {
        if self.mat_index & PRIM_NO_MATERIAL != 0 {
            None
        } else {
            Some(self.mat_index & PRIM_MATERIAL_MASK)
        }
    }
}

/// Per-vertex attribute arrays produced by extraction.
///
/// `points` and `uvs` are always dense. The optional arrays stay `None`
/// until a primitive actually supplies that attribute, then cover the full
/// vertex range with defaults backfilled.
#[derive(Debug, Clone, Default)]
pub struct VertexArrays {
    pub points: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub colors: Option<Vec<[u8; 4]>>,
    pub uv2s: Option<Vec<[f32; 2]>>,
}

impl VertexArrays {
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }
}

/// A joint referenced by a skin, with the scene node it resolved to.
#[derive(Debug, Clone)]
pub struct SkinJoint {
    pub sid: String,
    pub name: String,
}

/// One bone weight attached to an output vertex. Influences are stored
/// contiguously per vertex in ascending vertex order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    pub vertex: u32,
    pub bone: u32,
    pub weight: f32,
}

/// Resolved skinning data for one mesh.
#[derive(Debug, Clone, Default)]
pub struct SkinData {
    pub joints: Vec<SkinJoint>,
    pub influences: Vec<BoneInfluence>,
    pub bind_matrices: Vec<BoneMatrix3x4>,
}

impl SkinData {
    /// Densify the influence list into fixed four-wide bone index and weight
    /// arrays, one entry per vertex. Vertices without influences keep bone 0
    /// at weight zero.
    pub fn vertex_influences(&self, vertex_count: usize) -> (Vec<[u8; 4]>, Vec<[f32; 4]>) {
        let mut bones = vec![[0u8; 4]; vertex_count];
        let mut weights = vec![[0.0f32; 4]; vertex_count];
        let mut filled = vec![0usize; vertex_count];

        for influence in &self.influences {
            let vertex = influence.vertex as usize;
            if vertex >= vertex_count {
                continue;
            }
            let slot = filled[vertex];
            if slot >= MAX_WEIGHTS_PER_VERTEX {
                continue;
            }
            bones[vertex][slot] = influence.bone as u8;
            weights[vertex][slot] = influence.weight;
            filled[vertex] = slot + 1;
        }

        (bones, weights)
    }
}

/// Fully imported mesh: deduplicated vertices, a single index list, and the
/// primitive runs that slice it.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: VertexArrays,
    pub indices: Vec<u32>,
    pub primitives: Vec<DrawPrimitive>,
    pub skin: Option<SkinData>,
}

/// Packed mesh ready for serialization.
#[derive(Debug, Clone)]
pub struct ConvertedMesh {
    pub name: String,
    pub format: u8,
    pub vertex_count: u32,
    pub index_count: u32,
    pub vertex_data: Vec<u8>,
    pub indices: Vec<u16>,
    pub surfaces: Vec<MeshSurface>,
}

/// Import-wide settings, shared by the mesh and skeleton paths.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Scene time at which animated morph weights and material transforms
    /// are evaluated.
    pub time: f32,
    /// World transform applied to positions and baked into bone matrices.
    pub object_offset: Mat4,
    /// Negate Z and flip triangle winding for mirrored instances.
    pub mirrored: bool,
    /// Billboard detail size appended to mesh names when set.
    pub fixed_size: Option<u32>,
    /// Skip the node scale compensation normally folded into bone
    /// transforms.
    pub ignore_node_scale: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            time: 0.0,
            object_offset: Mat4::IDENTITY,
            mirrored: false,
            fixed_size: None,
            ignore_node_scale: false,
        }
    }
}

/// Hook for animated texture coordinate transforms. The importer calls this
/// for every UV it extracts; the default implementation is the identity.
pub trait UvTransform {
    fn apply(&self, material: Option<u32>, uv: [f32; 2], time: f32) -> [f32; 2];
}

/// Everything an import run produced: one entry per mesh discovered in the
/// scene, plus the material names referenced by primitive tags, indexed by
/// material slot.
#[derive(Debug, Clone, Default)]
pub struct ImportOutput {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_tag() {
        let prim = DrawPrimitive {
            start: 0,
            num_elements: 3,
            mat_index: PRIM_TRIANGLES | PRIM_INDEXED | 7,
        };
        assert_eq!(prim.material(), Some(7));

        let untagged = DrawPrimitive {
            start: 0,
            num_elements: 3,
            mat_index: PRIM_TRIANGLES | PRIM_INDEXED | PRIM_NO_MATERIAL,
        };
        assert_eq!(untagged.material(), None);
    }

    #[test]
    fn test_vertex_influences_densify() {
        let skin = SkinData {
            joints: Vec::new(),
            influences: vec![
                BoneInfluence { vertex: 0, bone: 2, weight: 0.75 },
                BoneInfluence { vertex: 0, bone: 5, weight: 0.25 },
                BoneInfluence { vertex: 2, bone: 1, weight: 1.0 },
            ],
            bind_matrices: Vec::new(),
        };
        let (bones, weights) = skin.vertex_influences(3);
        assert_eq!(bones[0], [2, 5, 0, 0]);
        assert_eq!(weights[0], [0.75, 0.25, 0.0, 0.0]);
        assert_eq!(bones[1], [0, 0, 0, 0]);
        assert_eq!(weights[2], [1.0, 0.0, 0.0, 0.0]);
    }
}
