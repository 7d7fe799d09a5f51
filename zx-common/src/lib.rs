//! Shared types and utilities for the Nethercore ZX console
//!
//! This crate provides the ZX-specific contract between the asset pipeline
//! and the console runtime: binary asset formats and the packed vertex
//! encodings the runtime uploads directly.
//!
//! # Modules
//!
//! - [`packing`] - Vertex data packing utilities (f32 → f16/snorm16/unorm8)
//! - [`formats`] - ZX-specific binary asset formats

pub mod formats;
pub mod packing;

// Re-export commonly used packing items
pub use packing::{
    FORMAT_COLOR, FORMAT_NORMAL, FORMAT_SKINNED, FORMAT_UV, FORMAT_UV2, encode_octahedral,
    f32_to_unorm8, pack_bone_weights_unorm8, pack_color_rgba_unorm8, pack_normal_octahedral,
    pack_octahedral_u32, pack_position_f16, pack_uv_unorm16, unpack_octahedral_u32,
    vertex_stride_packed,
};

// Re-export commonly used format items
pub use formats::{
    BinarySerializable, INVERSE_BIND_MATRIX_SIZE, MeshSurface, NetherZXMeshHeader,
    NetherZXSkeletonHeader,
};
