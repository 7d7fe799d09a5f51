//! Visual scene elements: node trees, instances, and material bindings.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualScene {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(default)]
    pub node: Vec<Node>,
}

/// Scene node. Transform elements are not modeled; callers bake any axis or
/// unit conversion into the import object offset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Node {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@sid")]
    pub sid: Option<String>,
    #[serde(default)]
    pub node: Vec<Node>,
    #[serde(default)]
    pub instance_geometry: Vec<InstanceGeometry>,
    #[serde(default)]
    pub instance_controller: Vec<InstanceController>,
}

impl Node {
    /// Display name: `name` attribute, else `id`, else "null".
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("null")
    }

    /// Find a node by scoped id within this subtree (self included).
    pub fn find_sid(&self, sid: &str) -> Option<&Node> {
        if self.sid.as_deref() == Some(sid) {
            return Some(self);
        }
        self.node.iter().find_map(|child| child.find_sid(sid))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceGeometry {
    #[serde(rename = "@url", default)]
    pub url: String,
    pub bind_material: Option<BindMaterial>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceController {
    #[serde(rename = "@url", default)]
    pub url: String,
    /// Skeleton root node URIs for joint sid resolution.
    #[serde(default)]
    pub skeleton: Vec<String>,
    pub bind_material: Option<BindMaterial>,
}

/// Maps primitive material symbols to material element targets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindMaterial {
    pub technique_common: Option<BindMaterialCommon>,
}

impl BindMaterial {
    pub fn find(&self, symbol: &str) -> Option<&InstanceMaterial> {
        self.technique_common
            .as_ref()?
            .instance_material
            .iter()
            .find(|im| im.symbol == symbol)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindMaterialCommon {
    #[serde(default)]
    pub instance_material: Vec<InstanceMaterial>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceMaterial {
    #[serde(rename = "@symbol", default)]
    pub symbol: String,
    #[serde(rename = "@target", default)]
    pub target: String,
}

/// Library material entry. Only identity is tracked; effects stay external.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Material {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@name")]
    pub name: Option<String>,
}

impl Material {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
