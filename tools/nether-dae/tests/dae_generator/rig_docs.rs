//! Controller documents: skinned and morphing triangles with a visual
//! scene, so the full instance path runs.

use super::{collada, float_source};

fn tri_geometry(id: &str, z: f32) -> String {
    let pos = float_source(
        &format!("{id}-pos"),
        &[0.0, 0.0, z, 1.0, 0.0, z, 1.0, 1.0, z],
        3,
        &["X", "Y", "Z"],
    );
    format!(
        r##"<geometry id="{id}" name="{id}">
      <mesh>
        {pos}
        <vertices id="{id}-verts"><input semantic="POSITION" source="#{id}-pos"/></vertices>
        <triangles count="1">
          <input semantic="VERTEX" source="#{id}-verts" offset="0"/>
          <p>0 1 2</p>
        </triangles>
      </mesh>
    </geometry>"##
    )
}

/// Skinned triangle with six joints. Source vertex 0 carries six weighted
/// bones (more than fit in a vertex), vertex 1 an even two-bone split, and
/// vertex 2 a single zero weight.
pub fn skinned_tri_dae() -> String {
    let geometry = tri_geometry("rig-geo", 0.0);
    let weights = float_source(
        "rig-weights",
        &[0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.5, 0.0],
        1,
        &["WEIGHT"],
    );
    let bone_nodes: String = (0..6)
        .map(|i| format!(r##"<node id="bone{i}" sid="b{i}" name="Bone{i}"/>"##))
        .collect();
    collada(&format!(
        r##"<library_geometries>{geometry}</library_geometries>
  <library_controllers>
    <controller id="rig-ctrl" name="RigSkin">
      <skin source="#rig-geo">
        <source id="rig-joints">
          <Name_array id="rig-joints-array" count="6">b0 b1 b2 b3 b4 b5</Name_array>
          <technique_common>
            <accessor source="#rig-joints-array" count="6" stride="1">
              <param name="JOINT" type="name"/>
            </accessor>
          </technique_common>
        </source>
        {weights}
        <joints>
          <input semantic="JOINT" source="#rig-joints"/>
        </joints>
        <vertex_weights count="3">
          <input semantic="JOINT" source="#rig-joints" offset="0"/>
          <input semantic="WEIGHT" source="#rig-weights" offset="1"/>
          <vcount>6 2 1</vcount>
          <v>0 0 1 1 2 2 3 3 4 4 5 5  0 6 1 6  0 7</v>
        </vertex_weights>
      </skin>
    </controller>
  </library_controllers>
  <library_visual_scenes>
    <visual_scene id="rig-scene">
      {bone_nodes}
      <node id="rig-node" name="Rig">
        <instance_controller url="#rig-ctrl"/>
      </node>
    </visual_scene>
  </library_visual_scenes>
  <scene><instance_visual_scene url="#rig-scene"/></scene>"##
    ))
}

/// Morph controller over a flat triangle with one target lifted to z=1,
/// instanced from a scene node named "Blend".
pub fn morph_dae(method: &str, weight: f32) -> String {
    let base = tri_geometry("blend-base", 0.0);
    let target = tri_geometry("blend-target", 1.0);
    collada(&format!(
        r##"<library_geometries>{base}{target}</library_geometries>
  <library_controllers>
    <controller id="blend-ctrl" name="Blender">
      <morph source="#blend-base" method="{method}">
        <source id="blend-targets">
          <IDREF_array id="blend-targets-array" count="1">blend-target</IDREF_array>
        </source>
        <source id="blend-weights">
          <float_array id="blend-weights-array" count="1">{weight}</float_array>
        </source>
        <targets>
          <input semantic="MORPH_TARGET" source="#blend-targets"/>
          <input semantic="MORPH_WEIGHT" source="#blend-weights"/>
        </targets>
      </morph>
    </controller>
  </library_controllers>
  <library_visual_scenes>
    <visual_scene id="blend-scene">
      <node id="blend-node" name="Blend">
        <instance_controller url="#blend-ctrl"/>
      </node>
    </visual_scene>
  </library_visual_scenes>
  <scene><instance_visual_scene url="#blend-scene"/></scene>"##
    ))
}
