//! COLLADA mesh importer (.dae -> .nczxmesh)
//!
//! Converts multi-indexed COLLADA geometry into the single-index layout the
//! ZX runtime draws: deduplicated vertex tuples, one u32 index list split
//! into 64K blocks, and per-material primitive runs. Controllers layer morph
//! blending and skinning on top of the base geometry.

mod morph;
mod packing;
mod primitives;
mod skin;
mod source;
mod streams;
mod types;
mod vertices;

pub use morph::build_morph;
pub use packing::pack_mesh;
pub(crate) use packing::parse_format_string;
pub use primitives::{build_primitives, primitive_tag, PrimitiveData, VertTuple};
pub use skin::{resolve_skin, skin_bone_count};
pub use types::{
    BoneInfluence, ConvertedMesh, DrawPrimitive, ImportOptions, ImportOutput, MeshData, SkinData,
    SkinJoint, UvTransform, VertexArrays, MAX_BONE_COUNT, MAX_WEIGHTS_PER_VERTEX, PRIM_INDEXED,
    PRIM_MATERIAL_MASK, PRIM_NO_MATERIAL, PRIM_TRIANGLES,
};
pub use vertices::{extract_vertex_data, ExtractMode};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;

use crate::dom::{
    fragment, BindMaterial, Document, InstanceController, InstanceGeometry, Mesh, Node,
};
use crate::formats::write_nether_mesh;
use crate::vertex_stride_packed;

/// Session-wide material list. Materials dedup by the id they resolve to;
/// the position in the list is the material index primitive tags carry.
#[derive(Default)]
struct MaterialRegistry {
    ids: Vec<String>,
}

impl MaterialRegistry {
    fn register(&mut self, id: &str) -> u32 {
        if let Some(pos) = self.ids.iter().position(|m| m == id) {
            return pos as u32;
        }
        self.ids.push(id.to_owned());
        (self.ids.len() - 1) as u32
    }

    /// Display names for the output, resolved through the material library.
    /// Unresolvable ids (unbound symbols) keep the id itself.
    fn names(&self, doc: &Document) -> Vec<String> {
        self.ids
            .iter()
            .map(|id| {
                doc.find_material(id)
                    .map(|m| m.display_name().to_owned())
                    .unwrap_or_else(|| id.clone())
            })
            .collect()
    }
}

/// Per-instance material binder. Primitive symbols resolve through the
/// instance's bind_material table to a library material; unbound symbols
/// register under their own name so they still draw distinctly.
struct MaterialBinder<'a> {
    registry: &'a mut MaterialRegistry,
    bindings: Option<&'a BindMaterial>,
    bound: HashMap<String, u32>,
}

impl<'a> MaterialBinder<'a> {
    fn new(registry: &'a mut MaterialRegistry, bindings: Option<&'a BindMaterial>) -> Self {
        Self {
            registry,
            bindings,
            bound: HashMap::new(),
        }
    }

    fn tag(&mut self, symbol: Option<&str>) -> u32 {
        let Some(symbol) = symbol else {
            return primitive_tag(None);
        };
        if let Some(&index) = self.bound.get(symbol) {
            return primitive_tag(Some(index));
        }
        let target = self
            .bindings
            .and_then(|b| b.find(symbol))
            .map(|im| fragment(&im.target))
            .unwrap_or(symbol);
        let index = self.registry.register(target);
        self.bound.insert(symbol.to_owned(), index);
        primitive_tag(Some(index))
    }
}

enum InstanceKind<'a> {
    Geometry(&'a InstanceGeometry),
    Controller(&'a InstanceController),
}

struct SceneInstance<'a> {
    node: &'a Node,
    ancestors: Vec<&'a Node>,
    kind: InstanceKind<'a>,
}

fn collect_instances<'a>(
    nodes: &'a [Node],
    ancestors: &mut Vec<&'a Node>,
    out: &mut Vec<SceneInstance<'a>>,
) {
    for node in nodes {
        for ig in &node.instance_geometry {
            out.push(SceneInstance {
                node,
                ancestors: ancestors.clone(),
                kind: InstanceKind::Geometry(ig),
            });
        }
        for ic in &node.instance_controller {
            out.push(SceneInstance {
                node,
                ancestors: ancestors.clone(),
                kind: InstanceKind::Controller(ic),
            });
        }
        ancestors.push(node);
        collect_instances(&node.node, ancestors, out);
        ancestors.pop();
    }
}

/// Mesh name for an instance node. Placeholder nodes (`null`, `*PIVOT`)
/// defer to the nearest named ancestor; a fixed detail size becomes a name
/// suffix.
fn mesh_name(node: &Node, ancestors: &[&Node], options: &ImportOptions) -> String {
    let mut name = node.display_name();
    let mut up = ancestors.iter().rev();
    while name == "null" || name.ends_with("PIVOT") {
        let Some(parent) = up.next() else { break };
        name = parent.display_name();
    }
    match options.fixed_size {
        Some(size) => format!("{} {}", name, size),
        None => name.to_owned(),
    }
}

/// Primitives plus extracted vertex arrays for one `<mesh>`.
fn geometry_arrays(
    mesh: &Mesh,
    name: &str,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
    material_tag: impl FnMut(Option<&str>) -> u32,
) -> Result<(PrimitiveData, VertexArrays)> {
    let data = build_primitives(mesh, name, options.mirrored, material_tag);
    let mut arrays = VertexArrays::default();
    extract_vertex_data(
        mesh,
        name,
        &data,
        ExtractMode::Append,
        &mut arrays,
        options,
        uv_transform,
    )?;
    Ok((data, arrays))
}

fn import_instance(
    doc: &Document,
    instance: &SceneInstance<'_>,
    registry: &mut MaterialRegistry,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
) -> Result<Option<MeshData>> {
    let name = mesh_name(instance.node, &instance.ancestors, options);

    match instance.kind {
        InstanceKind::Geometry(ig) => {
            let id = fragment(&ig.url);
            let Some(geometry) = doc.find_geometry(id) else {
                tracing::warn!("Failed to find the <geometry> element for '{}'", id);
                return Ok(None);
            };
            let Some(mesh) = geometry.mesh.as_ref() else {
                tracing::warn!("Geometry '{}' has no <mesh>; only mesh geometry is converted", id);
                return Ok(None);
            };

            let mut binder = MaterialBinder::new(registry, ig.bind_material.as_ref());
            let (data, arrays) =
                geometry_arrays(mesh, &name, options, uv_transform, |s| binder.tag(s))?;
            Ok(Some(MeshData {
                name,
                vertices: arrays,
                indices: data.indices,
                primitives: data.primitives,
                skin: None,
            }))
        }
        InstanceKind::Controller(ic) => {
            let id = fragment(&ic.url);
            let Some(controller) = doc.find_controller(id) else {
                tracing::warn!("Failed to find the <controller> element for '{}'", id);
                return Ok(None);
            };
            let ctrl_name = controller.name.as_deref().unwrap_or(&controller.id);
            let mut binder = MaterialBinder::new(registry, ic.bind_material.as_ref());

            if let Some(morph) = &controller.morph {
                let (data, arrays) =
                    build_morph(doc, ctrl_name, morph, options, uv_transform, |s| binder.tag(s))?;
                return Ok(Some(MeshData {
                    name,
                    vertices: arrays,
                    indices: data.indices,
                    primitives: data.primitives,
                    skin: None,
                }));
            }

            let Some(skin) = &controller.skin else {
                tracing::warn!("Controller '{}' has neither a <skin> nor a <morph>", id);
                return Ok(None);
            };

            // The skin source is normally a geometry but may be a morph
            // controller, in which case the blended arrays get skinned.
            let source_id = fragment(&skin.source);
            let (data, arrays) = if let Some(geometry) = doc.find_geometry(source_id) {
                let Some(mesh) = geometry.mesh.as_ref() else {
                    tracing::warn!("Skinned geometry '{}' has no <mesh>", source_id);
                    return Ok(None);
                };
                geometry_arrays(mesh, &name, options, uv_transform, |sym| binder.tag(sym))?
            } else if let Some(inner) = doc.find_controller(source_id) {
                let Some(morph) = &inner.morph else {
                    tracing::warn!(
                        "Skin source '{}' for controller '{}' is neither a geometry nor a morph",
                        source_id,
                        id
                    );
                    return Ok(None);
                };
                let inner_name = inner.name.as_deref().unwrap_or(&inner.id);
                build_morph(doc, inner_name, morph, options, uv_transform, |sym| binder.tag(sym))?
            } else {
                tracing::warn!(
                    "Failed to find the skinned geometry '{}' for controller '{}'",
                    source_id,
                    id
                );
                return Ok(None);
            };

            let skin_data = resolve_skin(
                doc,
                ctrl_name,
                skin,
                &ic.skeleton,
                Some(instance.node),
                &data,
                options,
            )?;
            Ok(Some(MeshData {
                name,
                vertices: arrays,
                indices: data.indices,
                primitives: data.primitives,
                skin: skin_data,
            }))
        }
    }
}

/// Import every mesh instanced by the document's visual scene.
///
/// Instances convert in document order; a failed instance logs and drops
/// only itself. Documents without a scene convert each library geometry
/// directly.
pub fn import_document(
    doc: &Document,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
) -> Result<ImportOutput> {
    let mut registry = MaterialRegistry::default();
    let mut meshes: Vec<MeshData> = Vec::new();

    let mut instances = Vec::new();
    if let Some(nodes) = doc.scene_nodes() {
        let mut ancestors = Vec::new();
        collect_instances(nodes, &mut ancestors, &mut instances);
    }

    if instances.is_empty() {
        for geometry in doc.geometries() {
            let Some(mesh) = geometry.mesh.as_ref() else { continue };
            let name = geometry.display_name().to_owned();
            let mut binder = MaterialBinder::new(&mut registry, None);
            match geometry_arrays(mesh, &name, options, uv_transform, |s| binder.tag(s)) {
                Ok((data, arrays)) => meshes.push(MeshData {
                    name,
                    vertices: arrays,
                    indices: data.indices,
                    primitives: data.primitives,
                    skin: None,
                }),
                Err(err) => {
                    tracing::error!("Failed to convert geometry '{}': {:#}", geometry.id, err)
                }
            }
        }
    } else {
        for instance in &instances {
            match import_instance(doc, instance, &mut registry, options, uv_transform) {
                Ok(Some(mesh)) => {
                    tracing::debug!(
                        "Imported '{}': {} vertices, {} indices, {} primitives",
                        mesh.name,
                        mesh.vertices.vertex_count(),
                        mesh.indices.len(),
                        mesh.primitives.len()
                    );
                    meshes.push(mesh);
                }
                Ok(None) => {}
                Err(err) => tracing::error!(
                    "Failed to convert '{}': {:#}",
                    instance.node.display_name(),
                    err
                ),
            }
        }
    }

    if meshes.is_empty() {
        bail!("No meshes were converted from the document");
    }

    let materials = registry.names(doc);
    Ok(ImportOutput { meshes, materials })
}

/// Convert a COLLADA file to in-memory mesh data (for direct ROM packing)
pub fn convert_dae_to_memory(
    input: &Path,
    options: &ImportOptions,
    uv_transform: Option<&dyn UvTransform>,
) -> Result<ImportOutput> {
    let doc = Document::from_file(input)?;
    import_document(&doc, options, uv_transform)
        .with_context(|| format!("Failed to convert {:?}", input))
}

/// Convert a COLLADA file and write one packed mesh.
///
/// `mesh_name` selects among the document's meshes; the default is the
/// first one found. `format_override` is a string such as "POS_UV_NORMAL".
pub fn convert_dae(
    input: &Path,
    output: &Path,
    options: &ImportOptions,
    format_override: Option<&str>,
    mesh_name: Option<&str>,
) -> Result<()> {
    let format = format_override.map(parse_format_string).transpose()?;
    let imported = convert_dae_to_memory(input, options, None)?;

    let mesh = match mesh_name {
        Some(wanted) => imported
            .meshes
            .iter()
            .find(|m| m.name == wanted)
            .with_context(|| format!("No mesh named '{}' in {:?}", wanted, input))?,
        None => imported
            .meshes
            .first()
            .context("No meshes in document")?,
    };

    let converted = pack_mesh(mesh, format)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);
    write_nether_mesh(&mut writer, &converted)?;

    tracing::info!(
        "Converted mesh '{}': {} vertices, {} indices, {} surfaces, format={}, stride={}",
        converted.name,
        converted.vertex_count,
        converted.index_count,
        converted.surfaces.len(),
        converted.format,
        vertex_stride_packed(converted.format)
    );

    Ok(())
}
