use forward_pipeline::renderer::casters::NO_SHADOW_INDEX;
use forward_pipeline::renderer::lights::{Light, LightKind, VisibleLight};
use forward_pipeline::renderer::shader_lib::{globals, keywords, renderer};
use forward_pipeline::renderer::{build_shadow_frustum, CullingService, ShadowFrame};
use forward_pipeline::scene::{Aabb, Camera, MeshRenderer, Scene, Transform};
use forward_pipeline::{FramePipeline, PipelineSettings, RecordingContext};
use glam::{Mat4, Vec3, Vec4};

const EPSILON: f32 = 1e-5;

fn sun() -> (Light, Transform) {
    (
        Light::new("Sun", LightKind::Directional, Vec3::ONE, 1.0).with_shadows(0.75, 0.03),
        Transform::looking_along(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.2, -1.0, -0.3)),
    )
}

fn camera() -> Camera {
    Camera::new("Main", Vec3::new(0.0, 6.0, 12.0), Vec3::ZERO)
}

fn cube_at(scene: &mut Scene, name: &str, position: Vec3) -> hecs::Entity {
    scene.spawn_renderer(
        name,
        Transform::from_translation(position),
        MeshRenderer::opaque(Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)),
    )
}

fn render(pipeline: &mut FramePipeline, scene: &Scene) -> (RecordingContext, ShadowFrame) {
    let mut context = RecordingContext::new();
    pipeline.render(&mut context, scene, &scene.environment, &[camera()]);
    let shadows = pipeline.last_frame()[0]
        .shadows
        .expect("shadow light present");
    (context, shadows)
}

#[test]
fn casters_fill_slots_and_compact_after_removal() {
    let mut scene = Scene::new();
    let (light, transform) = sun();
    scene.spawn_light(light, transform);
    let a = cube_at(&mut scene, "A", Vec3::new(-2.0, 0.5, 0.0));
    let b = cube_at(&mut scene, "B", Vec3::new(2.0, 0.5, 0.0));

    let mut pipeline = FramePipeline::new(PipelineSettings::default());
    assert_eq!(scene.enable_shadow_caster(a, 0.5, pipeline.registry_mut()), Some(0));
    assert_eq!(scene.enable_shadow_caster(b, 0.5, pipeline.registry_mut()), Some(1));

    let (context, first) = render(&mut pipeline, &scene);
    assert_eq!(first.count, 2);
    assert_eq!(first.drawn, 2);
    for slot in 0..2 {
        assert_ne!(first.matrices[slot], Mat4::ZERO);
        assert!((first.biases[slot] - 0.03).abs() < EPSILON);
        // Orthographic shadows carry no distance encoding.
        assert_eq!(first.distances[slot], 0.0);
    }
    for slot in 2..4 {
        assert_eq!(first.matrices[slot], Mat4::ZERO);
        assert_eq!(first.biases[slot], 0.0);
        assert_eq!(first.distances[slot], 0.0);
    }
    assert_eq!(
        context.single_draws(),
        [Scene::renderer_id(a), Scene::renderer_id(b)]
    );
    assert_eq!(context.global_float(globals::SHADOW_COUNT), Some(2.0));
    assert_eq!(context.global_float(globals::SHADOW_INTENSITY), Some(0.75));
    assert!(context.keyword_enabled(keywords::SHADOW_PROJECTION_ORTHO));

    assert!(scene.disable_shadow_caster(a, pipeline.registry_mut()));
    let properties = pipeline.registry().properties();
    assert_eq!(
        properties.get_float(Scene::renderer_id(a), renderer::SHADOW_INDEX),
        Some(NO_SHADOW_INDEX)
    );
    assert_eq!(
        properties.get_float(Scene::renderer_id(b), renderer::SHADOW_INDEX),
        Some(1.0)
    );

    let (context, second) = render(&mut pipeline, &scene);
    assert_eq!(second.count, 1);
    assert!(second.matrices[0].abs_diff_eq(first.matrices[1], EPSILON));
    for slot in 1..4 {
        assert_eq!(second.matrices[slot], Mat4::ZERO);
        assert_eq!(second.biases[slot], 0.0);
    }
    assert_eq!(context.single_draws(), [Scene::renderer_id(b)]);

    let uploaded = context
        .global_matrix_array(globals::SHADOW_MATRICES)
        .expect("shadow matrices uploaded");
    assert_eq!(uploaded.len(), 4);
    assert!(uploaded[0].abs_diff_eq(second.matrices[0], EPSILON));
}

#[test]
fn shadow_matrix_matches_frustum_builder() {
    let mut scene = Scene::new();
    let (light, transform) = sun();
    scene.spawn_light(light.clone(), transform);
    let a = cube_at(&mut scene, "A", Vec3::new(1.0, 0.5, -1.0));

    let mut pipeline = FramePipeline::default();
    scene.enable_shadow_caster(a, 0.25, pipeline.registry_mut());
    let (_, frame) = render(&mut pipeline, &scene);

    let bounds = scene
        .renderer_bounds(Scene::renderer_id(a))
        .expect("caster has bounds");
    let expected = build_shadow_frustum(&VisibleLight::new(light, transform), &bounds, 0.25);
    assert!(frame.matrices[0].abs_diff_eq(expected.view_projection(), EPSILON));
}

#[test]
fn point_light_shadows_encode_distance_and_use_perspective() {
    let mut scene = Scene::new();
    scene.spawn_light(
        Light::new("Bulb", LightKind::Point { range: 12.0 }, Vec3::ONE, 1.0).with_shadows(1.0, 0.01),
        Transform::from_translation(Vec3::new(0.0, 4.0, 0.0)),
    );
    let a = cube_at(&mut scene, "A", Vec3::new(0.0, 0.5, 0.0));

    let mut pipeline = FramePipeline::default();
    scene.enable_shadow_caster(a, 0.0, pipeline.registry_mut());
    let (context, frame) = render(&mut pipeline, &scene);

    assert!(!frame.orthographic);
    assert!((frame.distances[0] - 1.0 / 12.0).abs() < EPSILON);
    assert!(!context.keyword_enabled(keywords::SHADOW_PROJECTION_ORTHO));
    assert_eq!(
        context.global_vector(globals::SHADOW_DISTANCES),
        Some(Vec4::new(1.0 / 12.0, 0.0, 0.0, 0.0))
    );
}

#[test]
fn fifth_caster_is_rejected_and_drawn_without_shadows() {
    let mut scene = Scene::new();
    let (light, transform) = sun();
    scene.spawn_light(light, transform);

    let mut pipeline = FramePipeline::default();
    let mut entities = Vec::new();
    for i in 0..5 {
        let entity = cube_at(&mut scene, &format!("Cube {}", i), Vec3::new(i as f32 - 2.0, 0.5, 0.0));
        entities.push(entity);
    }
    let slots: Vec<_> = entities
        .iter()
        .map(|e| scene.enable_shadow_caster(*e, 0.5, pipeline.registry_mut()))
        .collect();
    assert_eq!(slots, [Some(0), Some(1), Some(2), Some(3), None]);

    let (context, frame) = render(&mut pipeline, &scene);
    assert_eq!(frame.count, 4);
    assert_eq!(context.single_draws().len(), 4);

    let rejected = Scene::renderer_id(entities[4]);
    let (_, dynamic) = context
        .draw_calls()
        .nth(2)
        .expect("dynamic opaque pass recorded");
    let drawn = dynamic
        .iter()
        .find(|d| d.id == rejected)
        .expect("rejected caster still drawn");
    assert_eq!(drawn.shadow_index, NO_SHADOW_INDEX);
}

#[test]
fn removed_renderer_is_skipped_in_shadow_pass() {
    let mut scene = Scene::new();
    let (light, transform) = sun();
    scene.spawn_light(light, transform);
    let a = cube_at(&mut scene, "A", Vec3::ZERO);
    let b = cube_at(&mut scene, "B", Vec3::X * 2.0);

    let mut pipeline = FramePipeline::default();
    scene.enable_shadow_caster(a, 0.5, pipeline.registry_mut());
    scene.enable_shadow_caster(b, 0.5, pipeline.registry_mut());

    // Despawned behind the registry's back: no bounds, so nothing to draw.
    scene.world.despawn(a).expect("entity exists");
    let (context, frame) = render(&mut pipeline, &scene);

    assert_eq!(frame.count, 2);
    assert_eq!(frame.drawn, 1);
    assert_eq!(frame.matrices[0], Mat4::ZERO);
    assert_ne!(frame.matrices[1], Mat4::ZERO);
    assert_eq!(context.single_draws(), [Scene::renderer_id(b)]);
}
