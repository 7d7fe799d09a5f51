//! Programmatic COLLADA generation for integration tests.
//!
//! Builds small .dae documents covering the importer's interesting paths:
//! shared-edge deduplication, multi-set texcoords, polylists, skins with too
//! many influences, morph controllers, and meshes large enough to overflow
//! the 16-bit index space.

#![allow(dead_code)]

mod mesh_docs;
mod rig_docs;

pub use mesh_docs::{
    duplicate_id_dae, giant_dae, multi_uv_dae, polylist_dae, quad_dae, two_element_uv_dae,
};
pub use rig_docs::{morph_dae, skinned_tri_dae};

/// Wrap library elements into a complete COLLADA document.
pub fn collada(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset><up_axis>Z_UP</up_axis></asset>
  {body}
</COLLADA>"#
    )
}

/// A `<source>` with a float array and one accessor param per component
/// name.
pub fn float_source(id: &str, values: &[f32], stride: usize, params: &[&str]) -> String {
    let data = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let params: String = params
        .iter()
        .map(|p| format!(r#"<param name="{p}" type="float"/>"#))
        .collect();
    format!(
        r##"<source id="{id}">
  <float_array id="{id}-array" count="{}">{data}</float_array>
  <technique_common>
    <accessor source="#{id}-array" count="{}" stride="{stride}">{params}</accessor>
  </technique_common>
</source>"##,
        values.len(),
        values.len() / stride
    )
}
