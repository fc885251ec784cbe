//! Builds per-slot indices, atlas UVs and local vertices from a display frame.

use crate::atlas::TextureData;
use crate::model::{DisplayData, DisplayFrame, Geometry};
use crate::slot::render_state::SlotRenderState;

/// Index list shared by every quad display.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Rebuild `state` for a new display frame.
///
/// Returns `false` when nothing was built. A frame without texture data
/// leaves `state` untouched; unsupported display types clear it.
pub fn build_geometry(state: &mut SlotRenderState, frame: &DisplayFrame) -> bool {
    let Some(texture) = frame.texture else {
        return false;
    };

    match &frame.display {
        Some(DisplayData::Mesh { geometry }) => build_mesh(state, &texture, geometry),
        Some(DisplayData::Image { pivot }) => {
            build_quad(state, &texture, *pivot);
            true
        }
        None => {
            build_quad(state, &texture, [0.0, 0.0]);
            true
        }
        Some(other) => {
            tracing::debug!("no geometry for display {other:?}");
            state.clear_geometry();
            false
        }
    }
}

fn build_mesh(state: &mut SlotRenderState, texture: &TextureData, geometry: &Geometry) -> bool {
    if let Err(e) = geometry.validate() {
        tracing::warn!("skipping invalid mesh geometry: {e}");
        state.clear_geometry();
        return false;
    }

    state.resize_indices(geometry.indices.len());
    state.indices.copy_from_slice(&geometry.indices);

    state.resize_vertices(geometry.vertex_count);
    for (dst, src) in state
        .uvs
        .chunks_exact_mut(2)
        .zip(geometry.uvs.chunks_exact(2))
    {
        let [u, v] = atlas_uv(texture, src[0], src[1]);
        dst[0] = u;
        dst[1] = v;
    }
    // Placeholder until the skinner runs.
    state.local_vertices.copy_from_slice(&geometry.vertices);
    true
}

fn build_quad(state: &mut SlotRenderState, texture: &TextureData, pivot: [f32; 2]) {
    state.resize_indices(QUAD_INDICES.len());
    state.indices.copy_from_slice(&QUAD_INDICES);

    state.resize_vertices(4);
    state.uvs.copy_from_slice(&quad_uvs(texture));
    state
        .local_vertices
        .copy_from_slice(&quad_vertices(texture, pivot));
}

/// Map a region-relative mesh UV into normalised atlas space.
pub fn atlas_uv(texture: &TextureData, u: f32, v: f32) -> [f32; 2] {
    let (w, h) = texture.atlas_size();
    let r = &texture.region;
    if texture.rotated {
        [(r.x + (1.0 - v) * r.width) / w, (r.y + u * r.height) / h]
    } else {
        [(r.x + u * r.width) / w, (r.y + v * r.height) / h]
    }
}

/// Corner UVs, clockwise from the displayed top-left.
pub fn quad_uvs(texture: &TextureData) -> [f32; 8] {
    let (w, h) = texture.atlas_size();
    let r = &texture.region;
    let l = r.x / w;
    let t = r.y / h;
    if texture.rotated {
        let right = (r.x + r.height) / w;
        let b = (r.y + r.width) / h;
        [right, t, right, b, l, b, l, t]
    } else {
        let right = (r.x + r.width) / w;
        let b = (r.y + r.height) / h;
        [l, t, right, t, right, b, l, b]
    }
}

/// Corner positions of the quad in slot space, shifted by the pivot.
pub fn quad_vertices(texture: &TextureData, pivot: [f32; 2]) -> [f32; 8] {
    let rect = texture.frame.unwrap_or(texture.region);
    let (width, height) = if texture.rotated && texture.frame.is_none() {
        (rect.height, rect.width)
    } else {
        (rect.width, rect.height)
    };

    let mut px = pivot[0] * width;
    let mut py = pivot[1] * height;
    if let Some(frame) = texture.frame {
        px += frame.x;
        py += frame.y;
    }

    [
        -px,
        -py,
        width - px,
        -py,
        width - px,
        height - py,
        -px,
        height - py,
    ]
}
