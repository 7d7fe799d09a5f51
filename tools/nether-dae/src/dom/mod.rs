//! Typed COLLADA document model.
//!
//! Deserializes the subset of COLLADA 1.4 the importer consumes: geometry
//! sources and primitives, skin and morph controllers, visual scene nodes,
//! and animations. Unknown elements and attributes are ignored, so documents
//! full of exporter extras parse without complaint.
//!
//! Array text is parsed into typed vectors during deserialization; later
//! stages never touch strings.

mod animation;
mod controller;
mod geometry;
mod scene;

pub use animation::{Animation, Channel, Sampler};
pub use controller::{Controller, Joints, Morph, MorphMethod, Skin, Targets, VertexWeights};
pub use geometry::{
    Accessor, FloatArray, Geometry, IdrefArray, InputLocal, InputRef, InputShared, Mesh,
    NameArray, Param, Polylist, PrimitiveElem, Source, SourceTechnique, Triangles,
    UnsupportedPrimitive, Vertices,
};
pub use scene::{
    BindMaterial, BindMaterialCommon, InstanceController, InstanceGeometry, InstanceMaterial,
    Material, Node, VisualScene,
};

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{self, Deserializer};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Text parsing helpers used by the element structs
// ---------------------------------------------------------------------------

pub(crate) fn default_stride() -> u32 {
    1
}

pub(crate) fn floats_from_text<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<f32>, D::Error> {
    let text = String::deserialize(de)?;
    text.split_ascii_whitespace()
        .map(|t| t.parse::<f32>().map_err(de::Error::custom))
        .collect()
}

pub(crate) fn ints_from_text<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<i32>, D::Error> {
    let text = String::deserialize(de)?;
    text.split_ascii_whitespace()
        .map(|t| t.parse::<i32>().map_err(de::Error::custom))
        .collect()
}

pub(crate) fn uints_from_text<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u32>, D::Error> {
    let text = String::deserialize(de)?;
    text.split_ascii_whitespace()
        .map(|t| t.parse::<u32>().map_err(de::Error::custom))
        .collect()
}

pub(crate) fn names_from_text<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let text = String::deserialize(de)?;
    Ok(text
        .split_ascii_whitespace()
        .map(str::to_owned)
        .collect())
}

// ---------------------------------------------------------------------------
// Root element and libraries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Collada {
    pub asset: Option<Asset>,
    #[serde(default)]
    pub library_geometries: Vec<LibraryGeometries>,
    #[serde(default)]
    pub library_controllers: Vec<LibraryControllers>,
    #[serde(default)]
    pub library_animations: Vec<LibraryAnimations>,
    #[serde(default)]
    pub library_materials: Vec<LibraryMaterials>,
    #[serde(default)]
    pub library_visual_scenes: Vec<LibraryVisualScenes>,
    pub scene: Option<Scene>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    /// Recorded for diagnostics only; axis conversion is the caller's
    /// object offset.
    pub up_axis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryGeometries {
    #[serde(default)]
    pub geometry: Vec<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryControllers {
    #[serde(default)]
    pub controller: Vec<Controller>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryAnimations {
    #[serde(default)]
    pub animation: Vec<Animation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryMaterials {
    #[serde(default)]
    pub material: Vec<Material>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryVisualScenes {
    #[serde(default)]
    pub visual_scene: Vec<VisualScene>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    pub instance_visual_scene: Option<InstanceVisualScene>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceVisualScene {
    #[serde(rename = "@url", default)]
    pub url: String,
}

// ---------------------------------------------------------------------------
// Document wrapper and id resolution
// ---------------------------------------------------------------------------

/// Strip the leading `#` from a URI fragment reference.
pub fn fragment(uri: &str) -> &str {
    uri.strip_prefix('#').unwrap_or(uri)
}

/// What an attribute input's source URI resolved to.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedInput<'a> {
    Source(&'a Source),
    Vertices(&'a Vertices),
}

/// Resolve an input source URI inside its owning scope: the scope's source
/// list first, then its `<vertices>` element. First matching id in
/// declaration order wins, which tolerates documents that reuse ids across
/// scopes.
pub fn resolve_input_source<'a>(
    uri: &str,
    sources: &'a [Source],
    vertices: Option<&'a Vertices>,
) -> Option<ResolvedInput<'a>> {
    let id = fragment(uri);
    if let Some(source) = sources.iter().find(|s| s.id == id) {
        return Some(ResolvedInput::Source(source));
    }
    match vertices {
        Some(v) if v.id == id => Some(ResolvedInput::Vertices(v)),
        _ => None,
    }
}

/// A parsed COLLADA document with id lookup helpers.
///
/// All lookups scan libraries in declaration order and return the first
/// match, mirroring how duplicate ids degrade in the scoped resolver.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub root: Collada,
}

impl Document {
    pub fn from_str(xml: &str) -> Result<Self> {
        let root: Collada =
            quick_xml::de::from_str(xml).context("Failed to parse COLLADA document")?;
        Ok(Self { root })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_str(&xml).with_context(|| format!("Failed to load {:?}", path))
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.root
            .library_geometries
            .iter()
            .flat_map(|lib| &lib.geometry)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.root
            .library_controllers
            .iter()
            .flat_map(|lib| &lib.controller)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.root
            .library_materials
            .iter()
            .flat_map(|lib| &lib.material)
    }

    pub fn visual_scenes(&self) -> impl Iterator<Item = &VisualScene> {
        self.root
            .library_visual_scenes
            .iter()
            .flat_map(|lib| &lib.visual_scene)
    }

    pub fn find_geometry(&self, id: &str) -> Option<&Geometry> {
        self.geometries().find(|g| g.id == id)
    }

    pub fn find_controller(&self, id: &str) -> Option<&Controller> {
        self.controllers().find(|c| c.id == id)
    }

    pub fn find_material(&self, id: &str) -> Option<&Material> {
        self.materials().find(|m| m.id == id)
    }

    pub fn find_visual_scene(&self, id: &str) -> Option<&VisualScene> {
        self.visual_scenes().find(|vs| vs.id == id)
    }

    /// Root nodes of the instantiated visual scene, if the document has one.
    pub fn scene_nodes(&self) -> Option<&[Node]> {
        let instance = self.root.scene.as_ref()?.instance_visual_scene.as_ref()?;
        self.find_visual_scene(fragment(&instance.url))
            .map(|vs| vs.node.as_slice())
    }

    /// Find a node by id anywhere in the document's visual scenes.
    pub fn find_node_by_id(&self, id: &str) -> Option<&Node> {
        fn walk<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
            for node in nodes {
                if node.id.as_deref() == Some(id) {
                    return Some(node);
                }
                if let Some(found) = walk(&node.node, id) {
                    return Some(found);
                }
            }
            None
        }
        self.visual_scenes().find_map(|vs| walk(&vs.node, id))
    }

    /// Find a node by scoped id across every visual scene.
    pub fn find_node_by_sid(&self, sid: &str) -> Option<&Node> {
        self.visual_scenes()
            .find_map(|vs| vs.node.iter().find_map(|n| n.find_sid(sid)))
    }

    /// Every `<animation>` element, nested ones included, in document order.
    pub fn all_animations(&self) -> Vec<&Animation> {
        fn walk<'a>(anim: &'a Animation, out: &mut Vec<&'a Animation>) {
            out.push(anim);
            for child in &anim.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for lib in &self.root.library_animations {
            for anim in &lib.animation {
                walk(anim, &mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <asset><up_axis>Z_UP</up_axis></asset>
  <library_geometries>
    <geometry id="box-lib" name="box">
      <mesh>
        <source id="box-pos">
          <float_array id="box-pos-array" count="6">0 0 0 1 0 0</float_array>
          <technique_common>
            <accessor count="2" stride="3" source="#box-pos-array">
              <param name="X" type="float"/>
              <param name="Y" type="float"/>
              <param name="Z" type="float"/>
            </accessor>
          </technique_common>
        </source>
        <source id="box-uv">
          <float_array count="4">0 0 1 1</float_array>
          <technique_common>
            <accessor count="2" stride="2">
              <param name="S" type="float"/>
              <param name="T" type="float"/>
            </accessor>
          </technique_common>
        </source>
        <vertices id="box-verts">
          <input semantic="POSITION" source="#box-pos"/>
        </vertices>
        <triangles count="1" material="mat0">
          <input semantic="VERTEX" source="#box-verts" offset="0"/>
          <input semantic="TEXCOORD" source="#box-uv" offset="1" set="2"/>
          <p>0 0 1 1 1 0</p>
        </triangles>
        <polylist count="1">
          <input semantic="VERTEX" source="#box-verts" offset="0"/>
          <vcount>4</vcount>
          <p>0 1 1 0</p>
        </polylist>
      </mesh>
    </geometry>
  </library_geometries>
  <library_controllers>
    <controller id="skin-ctrl">
      <skin source="#box-lib">
        <bind_shape_matrix>1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</bind_shape_matrix>
        <source id="skin-joints">
          <Name_array count="2">root tip</Name_array>
          <technique_common>
            <accessor count="2" stride="1"><param name="JOINT" type="name"/></accessor>
          </technique_common>
        </source>
        <source id="skin-weights">
          <float_array count="3">1 0.5 0.25</float_array>
          <technique_common>
            <accessor count="3" stride="1"><param name="WEIGHT" type="float"/></accessor>
          </technique_common>
        </source>
        <joints>
          <input semantic="JOINT" source="#skin-joints"/>
        </joints>
        <vertex_weights count="2">
          <input semantic="JOINT" source="#skin-joints" offset="0"/>
          <input semantic="WEIGHT" source="#skin-weights" offset="1"/>
          <vcount>2 1</vcount>
          <v>0 0 1 1 -1 2</v>
        </vertex_weights>
      </skin>
    </controller>
    <controller id="morph-ctrl">
      <morph source="#box-lib" method="NORMALIZED">
        <source id="morph-targets">
          <IDREF_array count="1">box-target</IDREF_array>
        </source>
        <source id="morph-weights">
          <float_array id="morph-weights-array" count="1">0.5</float_array>
        </source>
        <targets>
          <input semantic="MORPH_TARGET" source="#morph-targets"/>
          <input semantic="MORPH_WEIGHT" source="#morph-weights"/>
        </targets>
      </morph>
    </controller>
  </library_controllers>
  <library_animations>
    <animation id="outer">
      <animation id="inner">
        <source id="inner-times"><float_array count="2">0 1</float_array></source>
        <sampler id="inner-sampler">
          <input semantic="INPUT" source="#inner-times"/>
        </sampler>
        <channel source="#inner-sampler" target="morph-weights-array(0)"/>
      </animation>
    </animation>
  </library_animations>
  <library_materials>
    <material id="red-mat" name="Red"/>
  </library_materials>
  <library_visual_scenes>
    <visual_scene id="scene0">
      <node id="root-node" name="Root">
        <node id="shape-node" name="Shape" sid="shape">
          <instance_controller url="#skin-ctrl">
            <skeleton>#root-node</skeleton>
            <bind_material>
              <technique_common>
                <instance_material symbol="mat0" target="#red-mat"/>
              </technique_common>
            </bind_material>
          </instance_controller>
        </node>
      </node>
    </visual_scene>
  </library_visual_scenes>
  <scene><instance_visual_scene url="#scene0"/></scene>
</COLLADA>"##;

    #[test]
    fn test_parse_geometry() {
        let doc = Document::from_str(SAMPLE).unwrap();
        let geom = doc.find_geometry("box-lib").unwrap();
        assert_eq!(geom.display_name(), "box");

        let mesh = geom.mesh.as_ref().unwrap();
        assert_eq!(mesh.source.len(), 2);

        let pos = &mesh.source[0];
        assert_eq!(pos.id, "box-pos");
        assert_eq!(pos.floats(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let accessor = pos.accessor().unwrap();
        assert_eq!(accessor.count, 2);
        assert_eq!(accessor.stride, 3);
        assert_eq!(accessor.param[0].name.as_deref(), Some("X"));

        let verts = mesh.vertices.as_ref().unwrap();
        assert_eq!(verts.id, "box-verts");
        assert_eq!(verts.input[0].semantic, "POSITION");

        let elems: Vec<_> = mesh.primitive_elems().collect();
        assert_eq!(elems.len(), 2);
        match elems[0] {
            PrimitiveElem::Triangles(tris) => {
                assert_eq!(tris.material.as_deref(), Some("mat0"));
                assert_eq!(tris.input[1].set, Some(2));
                assert_eq!(tris.input[1].offset, 1);
                assert_eq!(tris.p, &[0, 0, 1, 1, 1, 0]);
            }
            _ => panic!("first primitive element should be the <triangles>"),
        }
        match elems[1] {
            PrimitiveElem::Polylist(poly) => {
                assert_eq!(poly.vcount, &[4]);
                assert_eq!(poly.p.len(), 4);
            }
            _ => panic!("second primitive element should be the <polylist>"),
        }
    }

    #[test]
    fn test_primitive_elems_keep_document_order() {
        let mesh: Mesh = quick_xml::de::from_str(
            r##"<mesh>
                 <source id="p"><float_array count="3">0 0 0</float_array></source>
                 <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
                 <polylist count="1" material="first">
                   <input semantic="VERTEX" source="#v" offset="0"/>
                   <vcount>3</vcount><p>0 0 0</p>
                 </polylist>
                 <lines count="1"><p>0 0</p></lines>
                 <triangles count="1" material="second">
                   <input semantic="VERTEX" source="#v" offset="0"/>
                   <p>0 0 0</p>
                 </triangles>
                 <polylist count="1" material="third">
                   <input semantic="VERTEX" source="#v" offset="0"/>
                   <vcount>3</vcount><p>0 0 0</p>
                 </polylist>
               </mesh>"##,
        )
        .unwrap();

        let materials: Vec<_> = mesh.primitive_elems().map(|e| e.material()).collect();
        assert_eq!(
            materials,
            &[Some("first"), Some("second"), Some("third")],
            "primitive elements must come back in document order, not grouped by kind"
        );
        assert_eq!(
            mesh.unsupported_kinds().collect::<Vec<_>>(),
            &[("lines", 1)]
        );
    }

    #[test]
    fn test_parse_controllers() {
        let doc = Document::from_str(SAMPLE).unwrap();

        let skin = doc.find_controller("skin-ctrl").unwrap().skin.as_ref().unwrap();
        assert_eq!(fragment(&skin.source), "box-lib");
        assert_eq!(skin.bind_shape_matrix.len(), 16);
        assert_eq!(skin.sources[0].names(), &["root", "tip"]);
        let vw = skin.vertex_weights.as_ref().unwrap();
        assert_eq!(vw.vcount, &[2, 1]);
        assert_eq!(vw.v, &[0, 0, 1, 1, -1, 2]);

        let morph = doc.find_controller("morph-ctrl").unwrap().morph.as_ref().unwrap();
        assert_eq!(morph.method, MorphMethod::Normalized);
        assert_eq!(morph.sources[0].names(), &["box-target"]);
        let targets = morph.targets.as_ref().unwrap();
        assert_eq!(targets.input[0].semantic, "MORPH_TARGET");
    }

    #[test]
    fn test_parse_scene() {
        let doc = Document::from_str(SAMPLE).unwrap();

        let roots = doc.scene_nodes().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].display_name(), "Root");

        let shape = doc.find_node_by_id("shape-node").unwrap();
        let instance = &shape.instance_controller[0];
        assert_eq!(instance.skeleton, &["#root-node"]);
        let bound = instance.bind_material.as_ref().unwrap().find("mat0").unwrap();
        assert_eq!(fragment(&bound.target), "red-mat");

        assert_eq!(
            doc.find_node_by_sid("shape").unwrap().id.as_deref(),
            Some("shape-node")
        );
        assert_eq!(doc.find_material("red-mat").unwrap().display_name(), "Red");
    }

    #[test]
    fn test_nested_animations_flatten() {
        let doc = Document::from_str(SAMPLE).unwrap();
        let anims = doc.all_animations();
        assert_eq!(anims.len(), 2);
        let inner = anims[1];
        assert_eq!(inner.id.as_deref(), Some("inner"));
        assert_eq!(inner.channel[0].target, "morph-weights-array(0)");
        assert_eq!(
            inner.sampler[0].input_source("INPUT"),
            Some("#inner-times")
        );
    }

    #[test]
    fn test_accessor_stride_defaults_to_one() {
        let source: Source = quick_xml::de::from_str(
            r##"<source id="w">
                 <float_array count="2">0 1</float_array>
                 <technique_common><accessor count="2"/></technique_common>
               </source>"##,
        )
        .unwrap();
        assert_eq!(source.accessor().unwrap().stride, 1);
    }

    #[test]
    fn test_duplicate_ids_resolve_in_declaration_order() {
        let mut first = Source::default();
        first.id = "dup".into();
        first.float_array = Some(FloatArray {
            id: None,
            data: vec![1.0],
        });
        let mut second = Source::default();
        second.id = "dup".into();
        second.float_array = Some(FloatArray {
            id: None,
            data: vec![2.0],
        });
        let sources = [first, second];

        match resolve_input_source("#dup", &sources, None) {
            Some(ResolvedInput::Source(s)) => assert_eq!(s.floats(), &[1.0]),
            other => panic!("expected first source, got {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_fragment() {
        assert_eq!(fragment("#abc"), "abc");
        assert_eq!(fragment("abc"), "abc");
    }

    #[test]
    fn test_empty_float_array() {
        let source: Source = quick_xml::de::from_str(
            r##"<source id="empty"><float_array count="0"></float_array></source>"##,
        )
        .unwrap();
        assert!(source.floats().is_empty());
    }
}
