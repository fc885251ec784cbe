//! End-to-end frame tests: armature displays through the renderer into a
//! recording backend.

use armature_render::armature::{ArmatureDisplay, StaticArmature};
use armature_render::atlas::{Rect, TextureData};
use armature_render::config::RenderConfig;
use armature_render::model::{
    BoneInfluence, ColorTransform, DisplayData, DisplayFrame, Geometry, Matrix, WeightTable,
};
use armature_render::render::{CommandRecorder, DrawCommand, Renderer, Vertex};
use armature_render::traits::armature::{Armature, SlotVisitor};
use armature_render::traits::render::TextureId;

fn renderer() -> Renderer<CommandRecorder> {
    Renderer::new(CommandRecorder::new(800, 600), &RenderConfig::default())
}

fn region(texture: TextureId, x: f32, y: f32, w: f32, h: f32) -> TextureData {
    TextureData {
        region: Rect::new(x, y, w, h),
        frame: None,
        rotated: false,
        atlas_width: 128,
        atlas_height: 128,
        render_texture: Some(texture),
    }
}

fn quad(texture: TextureData) -> DisplayFrame {
    DisplayFrame::new(Some(texture), Some(DisplayData::image(0.0, 0.0)))
}

fn draws(renderer: &Renderer<CommandRecorder>) -> Vec<(TextureId, Vec<Vertex>, Vec<u16>)> {
    renderer
        .backend()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::DrawTriangles {
                texture,
                vertices,
                indices,
            } => Some((*texture, vertices.clone(), indices.clone())),
            _ => None,
        })
        .collect()
}

fn assert_close(actual: [f32; 2], expected: [f32; 2]) {
    assert!(
        (actual[0] - expected[0]).abs() < 1e-4 && (actual[1] - expected[1]).abs() < 1e-4,
        "{actual:?} != {expected:?}"
    );
}

#[test]
fn test_single_quad_end_to_end() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut armature = StaticArmature::new("single");
    armature.add_slot("body", quad(region(tex, 0.0, 0.0, 64.0, 64.0)));
    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];

    renderer.render_frame(&mut displays).unwrap();

    let commands = renderer.backend().commands();
    assert_eq!(commands[0], DrawCommand::BeginFrame);
    assert!(matches!(commands[1], DrawCommand::Clear(_)));
    assert_eq!(commands.last(), Some(&DrawCommand::EndFrame));

    let draws = draws(&renderer);
    assert_eq!(draws.len(), 1);
    let (texture, vertices, indices) = &draws[0];
    assert_eq!(*texture, tex);
    assert_eq!(indices, &vec![0, 1, 2, 0, 2, 3]);

    let positions: Vec<[f32; 2]> = vertices.iter().map(|v| v.position).collect();
    let uvs: Vec<[f32; 2]> = vertices.iter().map(|v| v.uv).collect();
    assert_eq!(positions, vec![[0.0, 0.0], [64.0, 0.0], [64.0, 64.0], [0.0, 64.0]]);
    assert_eq!(uvs, vec![[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]]);
    assert!(vertices.iter().all(|v| v.color == [1.0; 4]));
}

#[test]
fn test_shared_texture_batches_into_one_draw() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut armature = StaticArmature::new("many");
    for i in 0..10 {
        armature.add_slot(format!("s{i}"), quad(region(tex, 0.0, 0.0, 16.0, 16.0)));
    }
    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];

    renderer.render_frame(&mut displays).unwrap();
    let draws = draws(&renderer);
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].1.len(), 40);
    assert_eq!(draws[0].2.len(), 60);
    assert_eq!(renderer.stats().draw_calls, 1);
}

#[test]
fn test_draw_order_preserved_across_texture_changes() {
    let mut renderer = renderer();
    let a = renderer.backend_mut().register_texture(128, 128);
    let b = renderer.backend_mut().register_texture(128, 128);

    let mut first = StaticArmature::new("first");
    first.add_slot("a1", quad(region(a, 0.0, 0.0, 8.0, 8.0)));
    first.add_slot("b1", quad(region(b, 0.0, 0.0, 8.0, 8.0)));
    let mut second = StaticArmature::new("second");
    second.add_slot("a2", quad(region(a, 0.0, 0.0, 8.0, 8.0)));
    second.add_slot("a3", quad(region(a, 8.0, 0.0, 8.0, 8.0)));

    let mut displays = vec![
        ArmatureDisplay::new(Box::new(first)),
        ArmatureDisplay::new(Box::new(second)),
    ];
    displays[1].set_position(100.0, 0.0);

    renderer.render_frame(&mut displays).unwrap();
    let draws = draws(&renderer);
    let textures: Vec<TextureId> = draws.iter().map(|d| d.0).collect();
    assert_eq!(textures, vec![a, b, a]);
    // The last batch holds both quads of the second display.
    assert_eq!(draws[2].1.len(), 8);
    assert_eq!(draws[2].1[0].position, [100.0, 0.0]);
}

#[test]
fn test_skipped_slots_contribute_nothing() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut armature = StaticArmature::new("skips");
    let hidden = armature.add_slot("hidden", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    let inactive = armature.add_slot("inactive", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    let transparent = armature.add_slot("transparent", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    armature.add_slot(
        "untextured",
        DisplayFrame::new(None, Some(DisplayData::image(0.0, 0.0))),
    );
    let mut unbound = region(tex, 0.0, 0.0, 8.0, 8.0);
    unbound.render_texture = None;
    armature.add_slot("unbound", quad(unbound));
    armature.add_slot(
        "armature",
        DisplayFrame::new(Some(region(tex, 0.0, 0.0, 8.0, 8.0)), Some(DisplayData::Armature)),
    );

    if let Some(slot) = armature.slot_mut(hidden) {
        slot.visible = false;
    }
    if let Some(slot) = armature.slot_mut(inactive) {
        slot.display_index = -1;
    }
    armature.set_color(transparent, &ColorTransform::new(1.0, 1.0, 1.0, 0.0));

    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];
    renderer.render_frame(&mut displays).unwrap();

    assert!(draws(&renderer).is_empty());
    assert_eq!(renderer.backend().commands().len(), 3);
}

#[test]
fn test_color_is_premultiplied() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut armature = StaticArmature::new("tinted");
    let slot = armature.add_slot("body", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    armature.set_color(slot, &ColorTransform::new(1.0, 0.5, 0.0, 0.5));

    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];
    renderer.render_frame(&mut displays).unwrap();
    let draws = draws(&renderer);
    assert_eq!(draws[0].1[0].color, [0.5, 0.25, 0.0, 0.5]);
}

#[test]
fn test_single_bone_skin_matches_rigid_transform() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);
    let texture = region(tex, 0.0, 0.0, 64.0, 64.0);

    let raw = vec![0.0, 0.0, 10.0, 0.0, 0.0, 10.0];
    let uvs = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    let bone = Matrix::from_transform(30.0, 40.0, std::f32::consts::FRAC_PI_2, 1.0, 2.0);

    let weights = WeightTable::from_vertices(raw.chunks_exact(2).map(|p| {
        [BoneInfluence {
            bone: 0,
            weight: 1.0,
            x: p[0],
            y: p[1],
        }]
    }));
    let skinned_mesh = Geometry::new(raw.clone(), uvs.clone(), vec![0, 1, 2]).with_weight(weights);
    let rigid_mesh = Geometry::new(raw, uvs, vec![0, 1, 2]);

    let mut skinned = StaticArmature::new("skinned");
    skinned.add_bone(Some(bone));
    skinned.add_slot(
        "mesh",
        DisplayFrame::new(Some(texture), Some(DisplayData::mesh(skinned_mesh))),
    );

    let mut rigid = StaticArmature::new("rigid");
    let slot = rigid.add_slot(
        "mesh",
        DisplayFrame::new(Some(texture), Some(DisplayData::mesh(rigid_mesh))),
    );
    rigid.set_slot_transform(slot, bone);

    let mut displays = vec![
        ArmatureDisplay::new(Box::new(skinned)),
        ArmatureDisplay::new(Box::new(rigid)),
    ];
    for display in &mut displays {
        display.set_position(5.0, 7.0);
        display.set_scale(2.0);
    }
    renderer.render_frame(&mut displays).unwrap();

    let draws = draws(&renderer);
    assert_eq!(draws.len(), 1);
    let vertices = &draws[0].1;
    assert_eq!(vertices.len(), 6);
    for i in 0..3 {
        assert_close(vertices[i].position, vertices[i + 3].position);
    }
    // Vertex (10, 0): rotated a quarter turn then scaled and translated.
    let (bx, by) = bone.apply(10.0, 0.0);
    assert_close(vertices[1].position, [bx * 2.0 + 5.0, by * 2.0 + 7.0]);
    assert_close(vertices[1].uv, [0.5, 0.0]);
    assert_eq!(draws[0].2, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_deform_offsets_unweighted_mesh() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);
    let mesh = Geometry::new(
        vec![0.0, 0.0, 4.0, 0.0, 0.0, 4.0],
        vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        vec![0, 1, 2],
    );

    let mut armature = StaticArmature::new("deformed");
    let slot = armature.add_slot(
        "mesh",
        DisplayFrame::new(
            Some(region(tex, 0.0, 0.0, 4.0, 4.0)),
            Some(DisplayData::mesh(mesh)),
        ),
    );
    if let Some(slot) = armature.slot_mut(slot) {
        slot.deform = vec![1.0, 1.0, 0.0, 0.0, -1.0, 0.5];
    }

    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];
    renderer.render_frame(&mut displays).unwrap();
    let positions: Vec<[f32; 2]> = draws(&renderer)[0].1.iter().map(|v| v.position).collect();
    assert_eq!(positions, vec![[1.0, 1.0], [4.0, 0.0], [-1.0, 4.5]]);
}

#[test]
fn test_consecutive_frames_are_independent() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);
    let mut armature = StaticArmature::new("loop");
    armature.add_slot("body", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];

    renderer.render_frame(&mut displays).unwrap();
    renderer.backend_mut().clear_commands();
    displays[0].set_position(10.0, 0.0);
    renderer.render_frame(&mut displays).unwrap();

    let draws = draws(&renderer);
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].1[0].position, [10.0, 0.0]);
    assert_eq!(draws[0].2, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_stale_texture_slot_does_not_block_scene() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut armature = StaticArmature::new("mixed");
    armature.add_slot("stale", quad(region(TextureId(99), 0.0, 0.0, 8.0, 8.0)));
    armature.add_slot("ok1", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    armature.add_slot("ok2", quad(region(tex, 8.0, 0.0, 8.0, 8.0)));
    let mut displays = vec![ArmatureDisplay::new(Box::new(armature))];

    renderer.render_frame(&mut displays).unwrap();

    let draws = draws(&renderer);
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].0, tex);
    assert_eq!(draws[0].1.len(), 8);
    assert_eq!(
        renderer.backend().commands().last(),
        Some(&DrawCommand::EndFrame)
    );
}

struct FailingArmature;

impl Armature for FailingArmature {
    fn advance_time(&mut self, _dt: f32) {}

    fn play(&mut self, _animation: &str) -> bool {
        false
    }

    fn visit_slots(&mut self, _visitor: &mut SlotVisitor<'_>) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("rig lost its pose"))
    }
}

#[test]
fn test_failing_display_still_presents_frame() {
    let mut renderer = renderer();
    let tex = renderer.backend_mut().register_texture(128, 128);

    let mut healthy = StaticArmature::new("healthy");
    healthy.add_slot("body", quad(region(tex, 0.0, 0.0, 8.0, 8.0)));
    let mut displays = vec![
        ArmatureDisplay::new(Box::new(FailingArmature)),
        ArmatureDisplay::new(Box::new(healthy)),
    ];

    let result = renderer.render_frame(&mut displays);
    assert!(result.is_err());
    assert_eq!(draws(&renderer).len(), 1);
    assert_eq!(
        renderer.backend().commands().last(),
        Some(&DrawCommand::EndFrame)
    );
}
