//! Controller elements: skins and morphs.

use serde::Deserialize;

use super::geometry::{InputLocal, InputShared, Source};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Controller {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    pub skin: Option<Skin>,
    pub morph: Option<Morph>,
}

/// `<skin>`: vertex weights plus joint/bind-matrix sources.
///
/// The `source` attribute points at the skinned geometry, which may itself
/// be a morph controller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Skin {
    #[serde(rename = "@source", default)]
    pub source: String,
    #[serde(
        deserialize_with = "crate::dom::floats_from_text",
        default
    )]
    pub bind_shape_matrix: Vec<f32>,
    #[serde(rename = "source", default)]
    pub sources: Vec<Source>,
    pub joints: Option<Joints>,
    pub vertex_weights: Option<VertexWeights>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Joints {
    #[serde(default)]
    pub input: Vec<InputLocal>,
}

/// Run-length encoded per-vertex influences: `vcount` influences per vertex,
/// each influence a fixed-stride group of ints in `v` (joint and weight
/// indices at their input offsets, joint index -1 meaning none).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VertexWeights {
    #[serde(rename = "@count", default)]
    pub count: u32,
    #[serde(default)]
    pub input: Vec<InputShared>,
    #[serde(deserialize_with = "crate::dom::uints_from_text", default)]
    pub vcount: Vec<u32>,
    #[serde(deserialize_with = "crate::dom::ints_from_text", default)]
    pub v: Vec<i32>,
}

/// `<morph>`: base geometry reference plus target/weight sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Morph {
    #[serde(rename = "@source", default)]
    pub source: String,
    #[serde(rename = "@method", default)]
    pub method: MorphMethod,
    #[serde(rename = "source", default)]
    pub sources: Vec<Source>,
    pub targets: Option<Targets>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum MorphMethod {
    /// Base contribution scaled by `clamp(1 - sum(weights), 0, 1)`.
    #[default]
    #[serde(rename = "NORMALIZED")]
    Normalized,
    /// Targets added on top of the unscaled base.
    #[serde(rename = "RELATIVE")]
    Relative,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Targets {
    #[serde(default)]
    pub input: Vec<InputLocal>,
}
