//! Animation elements, used for sampling animated morph weights.

use serde::Deserialize;

use super::geometry::{InputLocal, Source};

/// `<animation>` may nest arbitrarily; lookups flatten the tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Animation {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "animation", default)]
    pub children: Vec<Animation>,
    #[serde(rename = "source", default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub sampler: Vec<Sampler>,
    #[serde(default)]
    pub channel: Vec<Channel>,
}

/// Keyframe sampler: INPUT (times) and OUTPUT (values) inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sampler {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(default)]
    pub input: Vec<InputLocal>,
}

impl Sampler {
    /// Source URI of the input with the given semantic.
    pub fn input_source(&self, semantic: &str) -> Option<&str> {
        self.input
            .iter()
            .find(|i| i.semantic == semantic)
            .map(|i| i.source.as_str())
    }
}

/// Binds a sampler to a target address ("id" or "id(member)").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(rename = "@source", default)]
    pub source: String,
    #[serde(rename = "@target", default)]
    pub target: String,
}
