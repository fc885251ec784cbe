//! Per-frame mesh vertex update: bone-weighted skinning or free-form deformation.

use crate::model::{Geometry, Matrix, WeightTable};
use crate::slot::render_state::SlotRenderState;
use crate::traits::armature::SlotPose;

/// Recompute `state.local_vertices` for a mesh slot.
///
/// Weighted meshes come out in armature space; unweighted meshes stay in
/// mesh space.
pub fn update_mesh(state: &mut SlotRenderState, geometry: &Geometry, pose: &SlotPose<'_>) {
    match &geometry.weight {
        Some(weights) => skin_vertices(weights, pose.bones, &mut state.local_vertices),
        None => deform_vertices(&geometry.vertices, pose.deform, &mut state.local_vertices),
    }
}

/// Blend each vertex from its bone-local positions.
///
/// Influences whose bone is missing from `bones` contribute nothing.
pub fn skin_vertices(weights: &WeightTable, bones: &[Option<Matrix>], out: &mut [f32]) {
    for ((_, influences), position) in weights.iter().zip(out.chunks_exact_mut(2)) {
        let mut x = 0.0;
        let mut y = 0.0;
        for influence in influences {
            if let Some(Some(bone)) = bones.get(influence.bone) {
                let (bx, by) = bone.apply(influence.x, influence.y);
                x += bx * influence.weight;
                y += by * influence.weight;
            }
        }
        position[0] = x;
        position[1] = y;
    }
}

/// Copy the raw vertices and add deform offsets when they cover every vertex.
pub fn deform_vertices(raw: &[f32], deform: &[f32], out: &mut [f32]) {
    let len = out.len().min(raw.len());
    out[..len].copy_from_slice(&raw[..len]);

    if deform.is_empty() {
        return;
    }
    if deform.len() != raw.len() {
        tracing::trace!(
            "ignoring deform of {} floats for {} vertex floats",
            deform.len(),
            raw.len()
        );
        return;
    }
    for (v, offset) in out.iter_mut().zip(deform) {
        *v += offset;
    }
}
