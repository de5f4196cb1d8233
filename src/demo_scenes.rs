use glam::{Quat, Vec3};
use log::info;

use forward_pipeline::renderer::lights::{BakeType, Light, LightKind};
use forward_pipeline::renderer::ShadowCasterRegistry;
use forward_pipeline::scene::{Aabb, Camera, MeshRenderer, Scene, Transform};

#[derive(Clone, Copy, Debug)]
pub enum DemoScene {
    /// Three shadow casters on a lightmapped floor, lit by every light kind.
    ShadowTest,
    /// A grid of dynamic cubes lit by point lights only.
    Grid { size: i32 },
}

impl DemoScene {
    /// Picks a scene from the command line: `grid [size]`, anything else is the shadow test.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        match args.next().as_deref() {
            Some("grid") => DemoScene::Grid {
                size: args.next().and_then(|s| s.parse().ok()).unwrap_or(8),
            },
            _ => DemoScene::ShadowTest,
        }
    }

    pub fn build(self, registry: &mut ShadowCasterRegistry) -> (Scene, Vec<Camera>) {
        match self {
            DemoScene::ShadowTest => setup_shadow_test_scene(registry),
            DemoScene::Grid { size } => setup_grid_scene(size),
        }
    }
}

fn unit_cube() -> Aabb {
    Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
}

fn setup_shadow_test_scene(registry: &mut ShadowCasterRegistry) -> (Scene, Vec<Camera>) {
    let mut scene = Scene::new();

    let sun_rotation = Quat::from_rotation_arc(Vec3::Z, Vec3::new(0.3, -1.0, -0.6).normalize());
    scene.spawn_light(
        Light::new("Sun", LightKind::Directional, Vec3::new(1.0, 0.95, 0.85), 1.2)
            .with_shadows(0.8, 0.02),
        Transform::from_trs(Vec3::new(0.0, 10.0, 0.0), sun_rotation, Vec3::ONE),
    );
    scene.spawn_light(
        Light::new("Lamp", LightKind::Point { range: 6.0 }, Vec3::new(1.0, 0.6, 0.3), 2.0),
        Transform::from_translation(Vec3::new(-2.0, 2.0, 1.0)),
    );
    scene.spawn_light(
        Light::new(
            "Spot",
            LightKind::Spot {
                range: 10.0,
                angle: 40.0,
            },
            Vec3::ONE,
            3.0,
        )
        .with_bake_type(BakeType::Mixed),
        Transform::looking_along(Vec3::new(3.0, 4.0, 3.0), Vec3::new(-0.5, -1.0, -0.5)),
    );
    scene.spawn_light(
        Light::new("Bounce", LightKind::Point { range: 8.0 }, Vec3::splat(0.3), 1.0)
            .with_bake_type(BakeType::Baked),
        Transform::from_translation(Vec3::new(0.0, 1.0, -3.0)),
    );

    scene.spawn_renderer(
        "Floor",
        Transform::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::new(20.0, 0.1, 20.0)),
        MeshRenderer::opaque(unit_cube()).with_lightmap(0),
    );

    for (i, x) in [-2.5f32, 0.0, 2.5].into_iter().enumerate() {
        let cube = scene.spawn_renderer(
            format!("Caster {}", i),
            Transform::from_translation(Vec3::new(x, 0.55, 0.0)),
            MeshRenderer::opaque(unit_cube()),
        );
        scene.enable_shadow_caster(cube, 0.5, registry);
    }

    scene.spawn_renderer(
        "Glass",
        Transform::from_translation(Vec3::new(0.0, 1.0, 2.0)),
        MeshRenderer::transparent(unit_cube()),
    );

    let camera = Camera::new("Main Camera", Vec3::new(0.0, 6.0, 12.0), Vec3::ZERO);
    info!("Shadow test scene ready ({} shadow casters)", registry.len());
    (scene, vec![camera])
}

fn setup_grid_scene(size: i32) -> (Scene, Vec<Camera>) {
    let mut scene = Scene::new();
    let half = size / 2;
    for x in -half..=half {
        for z in -half..=half {
            scene.spawn_renderer(
                format!("Cube {} {}", x, z),
                Transform::from_translation(Vec3::new(x as f32 * 2.0, 0.0, z as f32 * 2.0)),
                MeshRenderer::opaque(unit_cube()),
            );
        }
    }
    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
        scene.spawn_light(
            Light::new(format!("Point {}", i), LightKind::Point { range: 8.0 }, Vec3::ONE, 1.0),
            Transform::from_translation(Vec3::new(angle.cos() * 5.0, 2.0, angle.sin() * 5.0)),
        );
    }

    let extent = size as f32 * 1.5 + 5.0;
    let camera = Camera::new("Grid Camera", Vec3::new(0.0, extent, extent), Vec3::ZERO);
    (scene, vec![camera])
}
