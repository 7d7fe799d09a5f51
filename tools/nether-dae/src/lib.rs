//! nether-dae library
//!
//! COLLADA (.dae) import for the Nethercore ZX asset pipeline: multi-indexed
//! geometry becomes deduplicated single-index meshes in the packed ZX vertex
//! layout, with morph blending and up-to-four-bone skinning resolved at
//! import time.

pub mod anim;
pub mod dom;
pub mod formats;
pub mod mesh;
pub mod skeleton;

// Re-export packing functions and vertex format constants from zx-common
pub use zx_common::{
    pack_bone_weights_unorm8, pack_color_rgba_unorm8, pack_normal_octahedral, pack_position_f16,
    pack_uv_unorm16, vertex_stride_packed, FORMAT_COLOR, FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_UV,
    FORMAT_UV2,
};

// Re-export shared math and ROM format constants
pub use nethercore_shared::{BoneMatrix3x4, ZX_ROM_FORMAT};

// Re-export key types for mesh conversion
pub use mesh::{
    convert_dae, convert_dae_to_memory, import_document, pack_mesh, ConvertedMesh, ImportOptions,
    ImportOutput, MeshData, UvTransform,
};

// Re-export skeleton conversion types
pub use skeleton::{
    convert_dae_skeleton, convert_dae_skeleton_to_memory, list_skins, ConvertedSkeleton,
};
