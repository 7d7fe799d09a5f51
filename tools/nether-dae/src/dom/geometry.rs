//! Geometry-side elements: data sources, accessors, inputs, and primitives.

use serde::Deserialize;

/// A named data array plus the accessor describing its layout.
///
/// `<source>` backs every attribute stream: positions, normals, texcoords,
/// joint names, inverse bind matrices, morph targets and weights.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    #[serde(rename = "@id", default)]
    pub id: String,
    pub float_array: Option<FloatArray>,
    #[serde(rename = "Name_array")]
    pub name_array: Option<NameArray>,
    #[serde(rename = "IDREF_array")]
    pub idref_array: Option<IdrefArray>,
    pub technique_common: Option<SourceTechnique>,
}

impl Source {
    /// The accessor under `technique_common`, when present.
    pub fn accessor(&self) -> Option<&Accessor> {
        self.technique_common
            .as_ref()
            .and_then(|t| t.accessor.as_ref())
    }

    /// Backing float data, empty when the source holds names instead.
    pub fn floats(&self) -> &[f32] {
        self.float_array
            .as_ref()
            .map(|a| a.data.as_slice())
            .unwrap_or(&[])
    }

    /// Backing name data (`Name_array` or `IDREF_array`).
    pub fn names(&self) -> &[String] {
        if let Some(a) = &self.name_array {
            return &a.data;
        }
        if let Some(a) = &self.idref_array {
            return &a.data;
        }
        &[]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FloatArray {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(
        rename = "$text",
        deserialize_with = "crate::dom::floats_from_text",
        default
    )]
    pub data: Vec<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameArray {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(
        rename = "$text",
        deserialize_with = "crate::dom::names_from_text",
        default
    )]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdrefArray {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(
        rename = "$text",
        deserialize_with = "crate::dom::names_from_text",
        default
    )]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceTechnique {
    pub accessor: Option<Accessor>,
}

/// Element count, stride, and named components of a source array.
#[derive(Debug, Clone, Deserialize)]
pub struct Accessor {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(rename = "@stride", default = "crate::dom::default_stride")]
    pub stride: u32,
    #[serde(default)]
    pub param: Vec<Param>,
}

impl Default for Accessor {
    fn default() -> Self {
        Self {
            count: 0,
            stride: 1,
            param: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Param {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@type")]
    pub ty: Option<String>,
}

/// `<vertices>`: the indirection grouping per-vertex inputs under one id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vertices {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub input: Vec<InputLocal>,
}

/// Input without offset or set (`<vertices>`, `<joints>`, sampler inputs).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputLocal {
    #[serde(rename = "@semantic", default)]
    pub semantic: String,
    #[serde(rename = "@source", default)]
    pub source: String,
}

/// Input with a corner offset and optional set number (primitive and
/// vertex-weight inputs).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputShared {
    #[serde(rename = "@semantic", default)]
    pub semantic: String,
    #[serde(rename = "@source", default)]
    pub source: String,
    #[serde(rename = "@offset", default)]
    pub offset: u32,
    #[serde(rename = "@set")]
    pub set: Option<u32>,
}

/// Either input shape viewed uniformly, so stream classification can walk
/// primitive inputs and `<vertices>` inputs with the same code.
#[derive(Debug, Clone, Copy)]
pub enum InputRef<'a> {
    Shared(&'a InputShared),
    Local(&'a InputLocal),
}

impl<'a> InputRef<'a> {
    pub fn semantic(&self) -> &'a str {
        match self {
            InputRef::Shared(i) => &i.semantic,
            InputRef::Local(i) => &i.semantic,
        }
    }

    pub fn source_uri(&self) -> &'a str {
        match self {
            InputRef::Shared(i) => &i.source,
            InputRef::Local(i) => &i.source,
        }
    }

    pub fn offset(&self) -> u32 {
        match self {
            InputRef::Shared(i) => i.offset,
            InputRef::Local(_) => 0,
        }
    }

    pub fn set(&self) -> Option<u32> {
        match self {
            InputRef::Shared(i) => i.set,
            InputRef::Local(_) => None,
        }
    }
}

/// `<triangles>`: interleaved corner indices, 3 corners per triangle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Triangles {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(rename = "@material")]
    pub material: Option<String>,
    #[serde(default)]
    pub input: Vec<InputShared>,
    #[serde(deserialize_with = "crate::dom::uints_from_text", default)]
    pub p: Vec<u32>,
}

/// `<polylist>`: variable-size polygons, fan-triangulated during import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Polylist {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(rename = "@material")]
    pub material: Option<String>,
    #[serde(default)]
    pub input: Vec<InputShared>,
    #[serde(deserialize_with = "crate::dom::uints_from_text", default)]
    pub vcount: Vec<u32>,
    #[serde(deserialize_with = "crate::dom::uints_from_text", default)]
    pub p: Vec<u32>,
}

/// Primitive kinds the importer recognizes but does not convert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsupportedPrimitive {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(rename = "@material")]
    pub material: Option<String>,
}

/// `<mesh>`: data sources, the vertices indirection, and primitive
/// elements, with primitives kept in document order so converted surfaces
/// line up with the source file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "MeshXml")]
pub struct Mesh {
    pub source: Vec<Source>,
    pub vertices: Option<Vertices>,
    elements: Vec<MeshElement>,
    unsupported: Vec<&'static str>,
}

#[derive(Debug, Clone)]
enum MeshElement {
    Triangles(Triangles),
    Polylist(Polylist),
}

/// Raw `<mesh>` children as deserialized. COLLADA fixes the set of element
/// names that may appear here; unconverted primitive kinds are kept only as
/// their names and `<extra>` payloads are dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MeshChild {
    Source(Source),
    Vertices(Vertices),
    Triangles(Triangles),
    Polylist(Polylist),
    Lines(UnsupportedPrimitive),
    Linestrips(UnsupportedPrimitive),
    Polygons(UnsupportedPrimitive),
    Trifans(UnsupportedPrimitive),
    Tristrips(UnsupportedPrimitive),
    Extra(serde::de::IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
struct MeshXml {
    #[serde(rename = "$value", default)]
    children: Vec<MeshChild>,
}

impl From<MeshXml> for Mesh {
    fn from(xml: MeshXml) -> Self {
        let mut mesh = Mesh::default();
        for child in xml.children {
            match child {
                MeshChild::Source(s) => mesh.source.push(s),
                MeshChild::Vertices(v) => {
                    // A second <vertices> is invalid; the first one wins,
                    // consistent with duplicate-id resolution.
                    mesh.vertices.get_or_insert(v);
                }
                MeshChild::Triangles(t) => mesh.elements.push(MeshElement::Triangles(t)),
                MeshChild::Polylist(p) => mesh.elements.push(MeshElement::Polylist(p)),
                MeshChild::Lines(_) => mesh.unsupported.push("lines"),
                MeshChild::Linestrips(_) => mesh.unsupported.push("linestrips"),
                MeshChild::Polygons(_) => mesh.unsupported.push("polygons"),
                MeshChild::Trifans(_) => mesh.unsupported.push("trifans"),
                MeshChild::Tristrips(_) => mesh.unsupported.push("tristrips"),
                MeshChild::Extra(_) => {}
            }
        }
        mesh
    }
}

impl Mesh {
    /// Supported primitive elements in document order. Primitive
    /// construction and vertex extraction both iterate this order, so tuple
    /// primitive ids line up across passes.
    pub fn primitive_elems(&self) -> impl Iterator<Item = PrimitiveElem<'_>> {
        self.elements.iter().map(|e| match e {
            MeshElement::Triangles(t) => PrimitiveElem::Triangles(t),
            MeshElement::Polylist(p) => PrimitiveElem::Polylist(p),
        })
    }

    /// Unsupported primitive kinds present in this mesh, with counts.
    pub fn unsupported_kinds(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        ["lines", "linestrips", "polygons", "trifans", "tristrips"]
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    self.unsupported.iter().filter(|&&u| u == kind).count(),
                )
            })
            .filter(|&(_, n)| n > 0)
    }
}

/// One supported primitive element of a mesh.
#[derive(Debug, Clone, Copy)]
pub enum PrimitiveElem<'a> {
    Triangles(&'a Triangles),
    Polylist(&'a Polylist),
}

impl<'a> PrimitiveElem<'a> {
    pub fn inputs(&self) -> &'a [InputShared] {
        match self {
            PrimitiveElem::Triangles(t) => &t.input,
            PrimitiveElem::Polylist(p) => &p.input,
        }
    }

    pub fn material(&self) -> Option<&'a str> {
        match self {
            PrimitiveElem::Triangles(t) => t.material.as_deref(),
            PrimitiveElem::Polylist(p) => p.material.as_deref(),
        }
    }

    /// The raw `<p>` index stream.
    pub fn indices(&self) -> &'a [u32] {
        match self {
            PrimitiveElem::Triangles(t) => &t.p,
            PrimitiveElem::Polylist(p) => &p.p,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    pub mesh: Option<Mesh>,
}

impl Geometry {
    /// Display name: `name` attribute, else the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
