//! Morph controller blending.
//!
//! The base geometry is imported normally, then each weighted target is
//! extracted over the same tuple list and accumulated into the base arrays.
//! Target weights come from the MORPH_WEIGHT source after animation
//! channels are applied, so a morph can be sampled at any scene time.

use anyhow::{anyhow, Result};

use crate::anim::sample_float_array;
use crate::dom::{fragment, resolve_input_source, Document, Geometry, Morph, MorphMethod, ResolvedInput, Source};
use crate::mesh::primitives::{build_primitives, PrimitiveData};
use crate::mesh::types::{ImportOptions, UvTransform, VertexArrays};
use crate::mesh::vertices::{extract_vertex_data, ExtractMode};

/// Build primitives and blended vertex arrays for a morph controller.
///
/// Fails when the base geometry is missing or a used target cannot deliver
/// vertex data; unresolvable targets and weight count mismatches degrade
/// with a warning instead.
pub fn build_morph(
    doc: &Document,
    controller_name: &str,
    morph: &Morph,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
    material_tag: impl FnMut(Option<&str>) -> u32,
) -> Result<(PrimitiveData, VertexArrays)> {
    let base_id = fragment(&morph.source);
    let base_geom = doc.find_geometry(base_id).ok_or_else(|| {
        anyhow!(
            "Failed to find the base geometry '{}' for morph controller '{}'",
            base_id,
            controller_name
        )
    })?;
    let base_mesh = base_geom.mesh.as_ref().ok_or_else(|| {
        anyhow!(
            "Base geometry '{}' of morph controller '{}' has no mesh data",
            base_id,
            controller_name
        )
    })?;

    let target_names = morph_input_source(morph, "MORPH_TARGET")
        .map(Source::names)
        .unwrap_or(&[]);
    let mut weights = morph_input_source(morph, "MORPH_WEIGHT")
        .map(|source| sample_float_array(doc, source, options.time))
        .unwrap_or_default();

    if weights.len() != target_names.len() {
        tracing::warn!(
            "Morph controller '{}' pairs {} targets with {} weights",
            controller_name,
            target_names.len(),
            weights.len()
        );
        weights.resize(target_names.len(), 0.0);
    }

    let data = build_primitives(
        base_mesh,
        base_geom.display_name(),
        options.mirrored,
        material_tag,
    );
    let mut arrays = VertexArrays::default();
    extract_vertex_data(
        base_mesh,
        base_geom.display_name(),
        &data,
        ExtractMode::Append,
        &mut arrays,
        options,
        uv_transform,
    )?;

    // IDREFs are bare ids, resolved positionally so each stays paired with
    // its weight even when some are missing.
    let targets: Vec<Option<&Geometry>> = target_names
        .iter()
        .map(|name| doc.find_geometry(name))
        .collect();

    if morph.method == MorphMethod::Normalized {
        let total: f32 = weights.iter().sum();
        scale_arrays(&mut arrays, (1.0 - total).clamp(0.0, 1.0));
    }

    for (target, &weight) in targets.iter().zip(&weights) {
        if weight == 0.0 {
            continue;
        }
        let Some(geometry) = target else {
            tracing::warn!(
                "Failed to find morph target geometry for controller '{}'",
                controller_name
            );
            continue;
        };
        let mesh = geometry.mesh.as_ref().ok_or_else(|| {
            anyhow!(
                "Morph target '{}' of controller '{}' has no mesh data",
                geometry.id,
                controller_name
            )
        })?;

        let mut temp = arrays.clone();
        extract_vertex_data(
            mesh,
            geometry.display_name(),
            &data,
            ExtractMode::Overlay,
            &mut temp,
            options,
            uv_transform,
        )?;
        accumulate(&mut arrays, &temp, weight);
    }

    Ok((data, arrays))
}

fn morph_input_source<'a>(morph: &'a Morph, semantic: &str) -> Option<&'a Source> {
    let input = morph
        .targets
        .as_ref()?
        .input
        .iter()
        .find(|i| i.semantic == semantic)?;
    match resolve_input_source(&input.source, &morph.sources, None)? {
        ResolvedInput::Source(source) => Some(source),
        ResolvedInput::Vertices(_) => None,
    }
}

fn scale_arrays(arrays: &mut VertexArrays, s: f32) {
    for p in &mut arrays.points {
        for c in p.iter_mut() {
            *c *= s;
        }
    }
    for uv in &mut arrays.uvs {
        for c in uv.iter_mut() {
            *c *= s;
        }
    }
    if let Some(normals) = &mut arrays.normals {
        for n in normals {
            for c in n.iter_mut() {
                *c *= s;
            }
        }
    }
    if let Some(uv2s) = &mut arrays.uv2s {
        for uv in uv2s {
            for c in uv.iter_mut() {
                *c *= s;
            }
        }
    }
    if let Some(colors) = &mut arrays.colors {
        for col in colors {
            for c in col.iter_mut() {
                *c = (*c as f32 * s) as u8;
            }
        }
    }
}

fn accumulate(base: &mut VertexArrays, temp: &VertexArrays, weight: f32) {
    for (b, t) in base.points.iter_mut().zip(&temp.points) {
        for c in 0..3 {
            b[c] += t[c] * weight;
        }
    }
    for (b, t) in base.uvs.iter_mut().zip(&temp.uvs) {
        for c in 0..2 {
            b[c] += t[c] * weight;
        }
    }
    if let (Some(bn), Some(tn)) = (&mut base.normals, &temp.normals) {
        for (b, t) in bn.iter_mut().zip(tn) {
            for c in 0..3 {
                b[c] += t[c] * weight;
            }
        }
    }
    if let (Some(bu), Some(tu)) = (&mut base.uv2s, &temp.uv2s) {
        for (b, t) in bu.iter_mut().zip(tu) {
            for c in 0..2 {
                b[c] += t[c] * weight;
            }
        }
    }
    if let (Some(bc), Some(tc)) = (&mut base.colors, &temp.colors) {
        for (b, t) in bc.iter_mut().zip(tc) {
            for c in 0..4 {
                b[c] = (b[c] as f32 + t[c] as f32 * weight).clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives::primitive_tag;

    fn tri_geo(id: &str, z: f32) -> String {
        format!(
            r##"<geometry id="{id}" name="{id}">
                 <mesh>
                   <source id="{id}-pos">
                     <float_array count="9">0 0 {z} 1 0 {z} 1 1 {z}</float_array>
                     <technique_common>
                       <accessor count="3" stride="3">
                         <param name="X" type="float"/><param name="Y" type="float"/><param name="Z" type="float"/>
                       </accessor>
                     </technique_common>
                   </source>
                   <vertices id="{id}-verts"><input semantic="POSITION" source="#{id}-pos"/></vertices>
                   <triangles count="1">
                     <input semantic="VERTEX" source="#{id}-verts" offset="0"/>
                     <p>0 1 2</p>
                   </triangles>
                 </mesh>
               </geometry>"##
        )
    }

    fn morph_doc(method: &str, target_ref: &str, weights: &str, animation: &str) -> Document {
        let base = tri_geo("base-geo", 0.0);
        let target = tri_geo("target-geo", 1.0);
        let xml = format!(
            r##"<COLLADA>
              <library_geometries>{base}{target}</library_geometries>
              <library_controllers>
                <controller id="ctrl" name="morpher">
                  <morph source="#base-geo" method="{method}">
                    <source id="targets-src"><IDREF_array count="1">{target_ref}</IDREF_array></source>
                    <source id="weights-src">
                      <float_array id="weights-array" count="1">{weights}</float_array>
                    </source>
                    <targets>
                      <input semantic="MORPH_TARGET" source="#targets-src"/>
                      <input semantic="MORPH_WEIGHT" source="#weights-src"/>
                    </targets>
                  </morph>
                </controller>
              </library_controllers>
              {animation}
            </COLLADA>"##
        );
        Document::from_str(&xml).unwrap()
    }

    fn blend(doc: &Document, options: &ImportOptions) -> Result<(PrimitiveData, VertexArrays)> {
        let morph = doc
            .find_controller("ctrl")
            .unwrap()
            .morph
            .as_ref()
            .unwrap();
        build_morph(doc, "morpher", morph, options, None, |s| {
            primitive_tag(s.map(|_| 0))
        })
    }

    fn assert_near(actual: [f32; 3], expected: [f32; 3]) {
        for c in 0..3 {
            assert!(
                (actual[c] - expected[c]).abs() < 1e-5,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_relative_blend_adds_weighted_target() {
        let doc = morph_doc("RELATIVE", "target-geo", "0.5", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        // Tuple 0 is document corner 2: base (1,1,0), target (1,1,1).
        assert_near(arrays.points[0], [1.5, 1.5, 0.5]);
    }

    #[test]
    fn test_normalized_full_weight_reaches_target() {
        let doc = morph_doc("NORMALIZED", "target-geo", "1.0", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        assert_near(arrays.points[0], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_normalized_partial_weight_scales_base() {
        let doc = morph_doc("NORMALIZED", "target-geo", "0.5", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        assert_near(arrays.points[0], [1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_zero_weight_keeps_base() {
        let doc = morph_doc("NORMALIZED", "target-geo", "0", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        assert_near(arrays.points[0], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_target_scales_but_skips_blend() {
        let doc = morph_doc("NORMALIZED", "no-such-geo", "0.5", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        assert_near(arrays.points[0], [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_weight_count_mismatch_pads_with_zero() {
        let doc = morph_doc("NORMALIZED", "target-geo", "", "");
        let (_, arrays) = blend(&doc, &ImportOptions::default()).unwrap();
        assert_near(arrays.points[0], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_base_geometry_fails() {
        let xml = r##"<COLLADA>
          <library_controllers>
            <controller id="ctrl"><morph source="#gone"/></controller>
          </library_controllers>
        </COLLADA>"##;
        let doc = Document::from_str(xml).unwrap();
        let err = blend(&doc, &ImportOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to find the base geometry"));
    }

    #[test]
    fn test_animated_weight_sampled_at_time() {
        let animation = r##"<library_animations>
          <animation id="a">
            <source id="a-times"><float_array count="2">0 1</float_array></source>
            <source id="a-values"><float_array count="2">0 1</float_array></source>
            <sampler id="a-sampler">
              <input semantic="INPUT" source="#a-times"/>
              <input semantic="OUTPUT" source="#a-values"/>
            </sampler>
            <channel source="#a-sampler" target="weights-array(0)"/>
          </animation>
        </library_animations>"##;
        let doc = morph_doc("NORMALIZED", "target-geo", "0", animation);
        let options = ImportOptions {
            time: 0.5,
            ..Default::default()
        };
        let (_, arrays) = blend(&doc, &options).unwrap();
        assert_near(arrays.points[0], [1.0, 1.0, 0.5]);
    }
}
