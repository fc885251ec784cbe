use anyhow::Result;

use crate::model::{ColorTransform, DisplayFrame};
use crate::slot::geometry_builder::build_geometry;
use crate::slot::render_state::SlotRenderState;
use crate::slot::skinning::update_mesh;
use crate::slot::transform::{DisplayTransform, resolve_rigid, resolve_skinned};
use crate::traits::armature::{RenderableSlot, SlotPose};
use crate::traits::render::MeshSink;

/// Renderer-side slot: caches geometry per display frame and submits a
/// transformed mesh every frame.
#[derive(Debug, Default)]
pub struct MeshSlot {
    state: SlotRenderState,
    frame: Option<DisplayFrame>,
}

impl MeshSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotRenderState {
        &self.state
    }

    pub fn frame(&self) -> Option<&DisplayFrame> {
        self.frame.as_ref()
    }
}

impl RenderableSlot for MeshSlot {
    fn on_frame_changed(&mut self, frame: DisplayFrame) {
        build_geometry(&mut self.state, &frame);
        self.frame = Some(frame);
    }

    fn on_color_changed(&mut self, color: &ColorTransform) {
        self.state.color = color.premultiplied();
    }

    fn render(
        &mut self,
        pose: &SlotPose<'_>,
        transform: &DisplayTransform,
        sink: &mut dyn MeshSink,
    ) -> Result<()> {
        let Self { state, frame } = self;

        let Some(frame) = frame.as_ref() else {
            return Ok(());
        };
        let Some(texture) = frame.texture.and_then(|t| t.render_texture) else {
            return Ok(());
        };
        if pose.display_index < 0 || !pose.visible || state.color[3] <= 0.0 {
            return Ok(());
        }
        if !state.has_geometry() {
            return Ok(());
        }

        match frame.geometry() {
            Some(geometry) => {
                update_mesh(state, geometry, pose);
                if geometry.is_weighted() {
                    resolve_skinned(&state.local_vertices, transform, &mut state.result_vertices);
                } else {
                    resolve_rigid(
                        &state.local_vertices,
                        &pose.global_transform,
                        transform,
                        &mut state.result_vertices,
                    );
                }
            }
            None => resolve_rigid(
                &state.local_vertices,
                &pose.global_transform,
                transform,
                &mut state.result_vertices,
            ),
        }

        sink.submit(
            texture,
            &state.result_vertices,
            &state.uvs,
            &state.indices,
            state.color,
        )
    }
}
