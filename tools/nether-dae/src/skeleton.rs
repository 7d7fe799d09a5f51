//! Skeleton converter (.dae -> .nczxskel)
//!
//! Runs the mesh import to resolve a controller's joints, then emits the
//! bind-pose correction matrices for skeletal animation.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nethercore_shared::BoneMatrix3x4;

use crate::dom::Document;
use crate::formats::write_nether_skeleton;
use crate::mesh::{convert_dae_to_memory, skin_bone_count, ImportOptions};

/// Result of in-memory skeleton conversion
#[derive(Debug, Clone)]
pub struct ConvertedSkeleton {
    /// Number of bones in the skeleton
    pub bone_count: u32,
    /// Resolved scene node name per bone, in joint order
    pub bone_names: Vec<String>,
    /// Bind-pose correction matrices, one per bone
    pub matrices: Vec<BoneMatrix3x4>,
}

/// Convert a COLLADA skeleton to in-memory format (for direct ROM packing)
///
/// # Arguments
/// * `input` - Path to the COLLADA file
/// * `mesh_name` - Optional mesh name to select (uses the first skinned mesh
///   if None)
pub fn convert_dae_skeleton_to_memory(
    input: &Path,
    options: &ImportOptions,
    mesh_name: Option<&str>,
) -> Result<ConvertedSkeleton> {
    let imported = convert_dae_to_memory(input, options, None)?;

    let mesh = if let Some(name) = mesh_name {
        imported
            .meshes
            .iter()
            .find(|m| m.name == name)
            .with_context(|| format!("No mesh named '{}' in {:?}", name, input))?
    } else {
        imported
            .meshes
            .iter()
            .find(|m| m.skin.is_some())
            .with_context(|| format!("No skinned meshes found in {:?}", input))?
    };

    let skin = mesh
        .skin
        .as_ref()
        .with_context(|| format!("Mesh '{}' has no skin", mesh.name))?;

    Ok(ConvertedSkeleton {
        bone_count: skin.joints.len() as u32,
        bone_names: skin.joints.iter().map(|j| j.name.clone()).collect(),
        matrices: skin.bind_matrices.clone(),
    })
}

/// Convert a COLLADA skin to NetherSkeleton format
pub fn convert_dae_skeleton(
    input: &Path,
    output: &Path,
    options: &ImportOptions,
    mesh_name: Option<&str>,
) -> Result<()> {
    let skeleton = convert_dae_skeleton_to_memory(input, options, mesh_name)?;

    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(file);

    write_nether_skeleton(&mut writer, &skeleton.matrices)?;

    tracing::info!("Exported skeleton: {} bones", skeleton.bone_count);

    Ok(())
}

/// List available skins in a COLLADA file
pub fn list_skins(input: &Path) -> Result<()> {
    let doc = Document::from_file(input)?;

    let skins: Vec<_> = doc
        .controllers()
        .filter_map(|c| c.skin.as_ref().map(|skin| (c, skin)))
        .collect();
    if skins.is_empty() {
        tracing::info!("No skins found in {:?}", input);
        return Ok(());
    }

    tracing::info!("Skins in {:?}:", input);
    for (i, (controller, skin)) in skins.iter().enumerate() {
        let name = controller.name.as_deref().unwrap_or(&controller.id);
        tracing::info!("  [{}] '{}': {} joints", i, name, skin_bone_count(skin));
    }

    Ok(())
}
