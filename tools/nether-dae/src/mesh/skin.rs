//! Skin controller resolution: bone influences and bind matrices.
//!
//! Influences are gathered per output vertex by following each tuple's raw
//! position index into the `<vertex_weights>` groups, capped to the four
//! largest weights, and renormalized to sum to one. Joint sids resolve
//! against the instance's `<skeleton>` roots first, then the whole scene,
//! then fall back to the node carrying the controller instance.

use anyhow::Result;
use glam::{Mat4, Vec3};
use nethercore_shared::BoneMatrix3x4;
use smallvec::SmallVec;

use crate::dom::{fragment, Document, InputRef, Node, Skin};
use crate::mesh::primitives::PrimitiveData;
use crate::mesh::streams::{
    classify_inputs, reader_for_slot, SLOT_INV_BIND, SLOT_JOINT, SLOT_WEIGHT,
};
use crate::mesh::types::{
    BoneInfluence, ImportOptions, SkinData, SkinJoint, MAX_BONE_COUNT, MAX_WEIGHTS_PER_VERTEX,
};

/// Fixed-capacity set of the strongest influences seen for one vertex.
/// Once full, a new weight replaces the smallest kept entry only when it is
/// strictly larger; equal weights keep the earlier entry.
#[derive(Debug, Default)]
struct InfluenceSet {
    entries: SmallVec<[(u32, f32); MAX_WEIGHTS_PER_VERTEX]>,
}

impl InfluenceSet {
    fn insert(&mut self, bone: u32, weight: f32) {
        if self.entries.len() < MAX_WEIGHTS_PER_VERTEX {
            self.entries.push((bone, weight));
            return;
        }
        let mut min = 0;
        for i in 1..self.entries.len() {
            if self.entries[i].1 < self.entries[min].1 {
                min = i;
            }
        }
        if weight > self.entries[min].1 {
            self.entries[min] = (bone, weight);
        }
    }
}

fn find_joint_node<'a>(doc: &'a Document, skeleton_uris: &[String], sid: &str) -> Option<&'a Node> {
    for uri in skeleton_uris {
        if let Some(root) = doc.find_node_by_id(fragment(uri)) {
            if let Some(node) = root.find_sid(sid) {
                return Some(node);
            }
        }
    }
    doc.find_node_by_sid(sid)
}

/// Number of joints a skin references, for listings and diagnostics.
pub fn skin_bone_count(skin: &Skin) -> usize {
    let inputs = skin.joints.as_ref().map(|j| j.input.as_slice()).unwrap_or(&[]);
    let classified = classify_inputs(inputs.iter().map(InputRef::Local), None);
    reader_for_slot(&classified, SLOT_JOINT, &skin.sources, None)
        .map(|r| r.len())
        .unwrap_or(0)
}

/// Resolve a skin against the primitives built from its base geometry.
///
/// Returns `Ok(None)` when the skin carries nothing usable (no vertex
/// weights, no joints), leaving the mesh unskinned. A skeleton larger than
/// the 8-bit bone index space is an error.
pub fn resolve_skin(
    doc: &Document,
    controller_name: &str,
    skin: &Skin,
    skeleton_uris: &[String],
    attach_node: Option<&Node>,
    data: &PrimitiveData,
    options: &ImportOptions,
) -> Result<Option<SkinData>> {
    let Some(vertex_weights) = skin.vertex_weights.as_ref() else {
        return Ok(None);
    };
    if vertex_weights.vcount.is_empty() {
        return Ok(None);
    }

    let joints_inputs = skin.joints.as_ref().map(|j| j.input.as_slice()).unwrap_or(&[]);
    let joints_classified = classify_inputs(joints_inputs.iter().map(InputRef::Local), None);
    let weights_classified =
        classify_inputs(vertex_weights.input.iter().map(InputRef::Shared), None);

    let sid_reader = reader_for_slot(&joints_classified, SLOT_JOINT, &skin.sources, None)
        .or_else(|| reader_for_slot(&weights_classified, SLOT_JOINT, &skin.sources, None));
    let Some(sid_reader) = sid_reader else {
        tracing::warn!(
            "Skin controller '{}' has no joint source; importing unskinned",
            controller_name
        );
        return Ok(None);
    };
    let Some(weight_reader) = reader_for_slot(&weights_classified, SLOT_WEIGHT, &skin.sources, None)
    else {
        tracing::warn!(
            "Skin controller '{}' has no readable weight source; importing unskinned",
            controller_name
        );
        return Ok(None);
    };

    let bone_count = sid_reader.len();
    if bone_count == 0 {
        tracing::warn!(
            "Skin controller '{}' declares no joints; importing unskinned",
            controller_name
        );
        return Ok(None);
    }
    if bone_count > MAX_BONE_COUNT {
        anyhow::bail!(
            "Skin controller '{}' uses {} bones; the limit is {}",
            controller_name,
            bone_count,
            MAX_BONE_COUNT
        );
    }

    // The bind shape maps mesh space to skin space; folding in the inverse
    // object offset keeps skinned points consistent with the offset applied
    // during extraction.
    let bind_shape = if skin.bind_shape_matrix.len() == 16 {
        let mut arr = [0.0f32; 16];
        arr.copy_from_slice(&skin.bind_shape_matrix);
        Mat4::from_cols_array(&arr).transpose()
    } else {
        Mat4::IDENTITY
    };
    let bind_shape = bind_shape * options.object_offset.inverse();

    let inv_bind_reader = reader_for_slot(&joints_classified, SLOT_INV_BIND, &skin.sources, None);

    let mut joints = Vec::with_capacity(bone_count);
    let mut bind_matrices = Vec::with_capacity(bone_count);
    for bone in 0..bone_count {
        let sid = sid_reader.read_name(bone as i32).unwrap_or("");
        let node = find_joint_node(doc, skeleton_uris, sid);
        let name = match node {
            Some(n) => n.display_name().to_string(),
            None => match attach_node {
                Some(parent) => {
                    tracing::warn!(
                        "Failed to find bone '{}', defaulting to instance_controller parent node '{}'",
                        sid,
                        parent.display_name()
                    );
                    parent.display_name().to_string()
                }
                None => {
                    tracing::warn!("Failed to find bone '{}'", sid);
                    sid.to_string()
                }
            },
        };
        joints.push(SkinJoint {
            sid: sid.to_string(),
            name,
        });

        let inv_bind = inv_bind_reader
            .as_ref()
            .and_then(|r| r.read_mat4(bone as i32))
            .unwrap_or(Mat4::IDENTITY);

        let mut m = options.object_offset;
        if !options.ignore_node_scale {
            // Undo scale baked into the inverse bind so bone transforms stay
            // rigid.
            let recip = |s: f32| if s > 0.0 { 1.0 / s } else { 1.0 };
            m *= Mat4::from_scale(Vec3::new(
                recip(inv_bind.x_axis.truncate().length()),
                recip(inv_bind.y_axis.truncate().length()),
                recip(inv_bind.z_axis.truncate().length()),
            ));
        }
        if inv_bind.determinant() < 0.0 {
            m *= Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
        }
        let m = m * inv_bind * bind_shape;
        bind_matrices.push(BoneMatrix3x4::from_rows(
            m.row(0).to_array(),
            m.row(1).to_array(),
            m.row(2).to_array(),
        ));
    }

    // <v> holds interleaved joint/weight index pairs, grouped per source
    // vertex by <vcount>.
    let pair_stride = weights_classified.stride();
    let joint_off = weights_classified.offset(SLOT_JOINT).unwrap_or(0) as usize;
    let weight_off = weights_classified.offset(SLOT_WEIGHT).unwrap_or(1) as usize;

    let mut group_starts = Vec::with_capacity(vertex_weights.vcount.len());
    let mut running = 0usize;
    for &n in &vertex_weights.vcount {
        group_starts.push(running);
        running += n as usize * pair_stride;
    }

    let v = &vertex_weights.v;
    let mut influences = Vec::new();
    let mut warned_cap = false;

    for (out_vertex, tuple) in data.vert_tuples.iter().enumerate() {
        if tuple.vertex < 0 {
            continue;
        }
        let src = tuple.vertex as usize;
        let Some(&start) = group_starts.get(src) else {
            continue;
        };
        let pairs = vertex_weights.vcount[src] as usize;

        if pairs > MAX_WEIGHTS_PER_VERTEX && !warned_cap {
            warned_cap = true;
            tracing::warn!(
                "At least one vertex has too many bone weights; limiting to the largest {} influences",
                MAX_WEIGHTS_PER_VERTEX
            );
        }

        let mut set = InfluenceSet::default();
        for k in 0..pairs {
            let base = start + k * pair_stride;
            let Some(&bone) = v.get(base + joint_off) else {
                continue;
            };
            if bone < 0 || bone as usize >= bone_count {
                continue;
            }
            let weight = v
                .get(base + weight_off)
                .and_then(|&idx| weight_reader.read_f32(idx))
                .unwrap_or(0.0);
            if weight <= 0.0 {
                continue;
            }
            set.insert(bone as u32, weight);
        }

        let total: f32 = set.entries.iter().map(|e| e.1).sum();
        if total <= 0.0 {
            continue;
        }
        for &(bone, weight) in &set.entries {
            influences.push(BoneInfluence {
                vertex: out_vertex as u32,
                bone,
                weight: weight / total,
            });
        }
    }

    Ok(Some(SkinData {
        joints,
        influences,
        bind_matrices,
    }))
}
