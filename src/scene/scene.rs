// scene/scene.rs - hecs world plus the culling queries the pipeline needs
use glam::{Mat4, Vec3, Vec4};
use hecs::{Entity, World};

use super::components::*;
use crate::environment::Environment;
use crate::error::{PipelineError, Result};
use crate::renderer::casters::ShadowCasterRegistry;
use crate::renderer::context::{CullResults, CullingParameters, CullingService, VisibleRenderer};
use crate::renderer::lights::{Light, VisibleLight};
use crate::scene::{Aabb, Camera, RendererId, Transform};

pub struct Scene {
    pub world: World,
    pub environment: Environment,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            environment: Environment::default(),
        }
    }

    pub fn spawn_light(&mut self, light: Light, transform: Transform) -> Entity {
        self.world.spawn((
            Name::new(light.name.clone()),
            TransformComponent(transform),
            LightComponent(light),
        ))
    }

    pub fn spawn_renderer(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        mut renderer: MeshRenderer,
    ) -> Entity {
        renderer.refresh_layers();
        self.world.spawn((
            Name::new(name),
            TransformComponent(transform),
            renderer,
        ))
    }

    pub fn renderer_id(entity: Entity) -> RendererId {
        RendererId(entity.to_bits().get())
    }

    pub fn entity_of(renderer: RendererId) -> Option<Entity> {
        Entity::from_bits(renderer.0)
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) -> bool {
        self.world.insert_one(entity, Visible(visible)).is_ok()
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) -> bool {
        match self.world.get::<&mut TransformComponent>(entity) {
            Ok(mut current) => {
                current.0 = transform;
                true
            }
            Err(_) => false,
        }
    }

    /// Adds the caster component and registers the renderer for a shadow slot.
    ///
    /// Returns the slot, or `None` when the entity has no renderer or the
    /// registry is full (the entity is then left without shadows).
    pub fn enable_shadow_caster(
        &mut self,
        entity: Entity,
        padding: f32,
        registry: &mut ShadowCasterRegistry,
    ) -> Option<usize> {
        if self.world.get::<&MeshRenderer>(entity).is_err() {
            log::warn!("Entity {:?} has no renderer; cannot cast shadows", entity);
            return None;
        }
        let slot = registry.register(Self::renderer_id(entity), padding)?;
        self.world
            .insert_one(entity, ShadowCasterComponent { padding })
            .ok()?;
        Some(slot)
    }

    pub fn disable_shadow_caster(
        &mut self,
        entity: Entity,
        registry: &mut ShadowCasterRegistry,
    ) -> bool {
        let _ = self.world.remove_one::<ShadowCasterComponent>(entity);
        registry.unregister(Self::renderer_id(entity))
    }

    /// Despawns an entity, releasing its shadow slot and renderer properties first.
    pub fn despawn(&mut self, entity: Entity, registry: &mut ShadowCasterRegistry) -> bool {
        registry.forget(Self::renderer_id(entity));
        self.world.despawn(entity).is_ok()
    }

    pub fn set_lightmap(&mut self, entity: Entity, lightmap_index: Option<u32>) -> bool {
        match self.world.get::<&mut MeshRenderer>(entity) {
            Ok(mut renderer) => {
                renderer.lightmap_index = lightmap_index;
                true
            }
            Err(_) => false,
        }
    }

    /// Re-derives every renderer's layer bits, e.g. after a lightmap bake.
    pub fn refresh_render_layers(&mut self) -> usize {
        let mut refreshed = 0;
        for (_, renderer) in self.world.query_mut::<&mut MeshRenderer>() {
            renderer.refresh_layers();
            refreshed += 1;
        }
        log::debug!("Refreshed render layers on {} renderers", refreshed);
        refreshed
    }

    fn is_visible(&self, entity: Entity) -> bool {
        self.world
            .get::<&Visible>(entity)
            .map(|v| v.0)
            .unwrap_or(true)
    }

    fn world_bounds(renderer: &MeshRenderer, transform: &Transform) -> Aabb {
        renderer.local_bounds.transformed(&transform.matrix())
    }
}

impl CullingService for Scene {
    fn culling_parameters(&self, camera: &Camera) -> Result<CullingParameters> {
        if !camera.enabled {
            return Err(PipelineError::CullingFailed {
                camera: camera.name.clone(),
                reason: "camera is disabled".to_string(),
            });
        }
        if !camera.has_viewport_area() {
            return Err(PipelineError::CullingFailed {
                camera: camera.name.clone(),
                reason: format!("viewport {}x{} has no area", camera.pixel_size.x, camera.pixel_size.y),
            });
        }
        Ok(CullingParameters {
            camera_name: camera.name.clone(),
            view_proj: camera.view_proj(),
            camera_position: camera.position(),
            culling_mask: camera.culling_mask,
        })
    }

    fn cull(&self, params: &CullingParameters) -> CullResults {
        let frustum = Frustum::from_view_proj(&params.view_proj);

        let mut lights: Vec<(u32, VisibleLight)> = self
            .world
            .query::<(&LightComponent, &TransformComponent)>()
            .iter()
            .filter(|(entity, _)| self.is_visible(*entity))
            .filter(|(_, (light, transform))| match light.0.kind.range() {
                None => true,
                Some(range) => frustum.intersects_sphere(transform.0.translation, range),
            })
            .map(|(entity, (light, transform))| {
                (entity.id(), VisibleLight::new(light.0.clone(), transform.0))
            })
            .collect();
        lights.sort_by_key(|(id, _)| *id);

        let mut renderers: Vec<(u32, VisibleRenderer)> = self
            .world
            .query::<(&MeshRenderer, &TransformComponent)>()
            .iter()
            .filter(|(entity, _)| self.is_visible(*entity))
            .filter_map(|(entity, (renderer, transform))| {
                let bounds = Self::world_bounds(renderer, &transform.0);
                frustum.intersects_aabb(&bounds).then(|| {
                    (
                        entity.id(),
                        VisibleRenderer {
                            id: Self::renderer_id(entity),
                            render_queue: renderer.render_queue,
                            layer: renderer.layer,
                            rendering_layers: renderer.rendering_layers,
                            bounds,
                        },
                    )
                })
            })
            .collect();
        renderers.sort_by_key(|(id, _)| *id);

        log::trace!(
            "Culled '{}': {} lights, {} renderers",
            params.camera_name,
            lights.len(),
            renderers.len()
        );

        CullResults {
            visible_lights: lights.into_iter().map(|(_, l)| l).collect(),
            visible_renderers: renderers.into_iter().map(|(_, r)| r).collect(),
        }
    }

    fn renderer_bounds(&self, renderer: RendererId) -> Option<Aabb> {
        let entity = Self::entity_of(renderer)?;
        let mesh = self.world.get::<&MeshRenderer>(entity).ok()?;
        let transform = self.world.get::<&TransformComponent>(entity).ok()?;
        Some(Self::world_bounds(&mesh, &transform.0))
    }
}

/// Clip-space planes of a `[0, 1]` depth view-projection, normals pointing inward.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|p| {
            let len = p.truncate().length();
            if len > 0.0 {
                p / len
            } else {
                p
            }
        });
        Self { planes }
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }

    pub fn intersects_aabb(&self, bounds: &Aabb) -> bool {
        self.planes.iter().all(|p| {
            let normal = p.truncate();
            let positive = Vec3::select(normal.cmpge(Vec3::ZERO), bounds.max, bounds.min);
            normal.dot(positive) + p.w >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::lights::{BakeType, LightKind};
    use crate::renderer::shader_lib::RenderLayers;
    use glam::UVec2;

    fn camera() -> Camera {
        Camera::new("Main", Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }

    fn unit_box() -> Aabb {
        Aabb::from_center_size(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn frustum_keeps_objects_in_front_and_drops_behind() {
        let mut scene = Scene::new();
        let front = scene.spawn_renderer("Front", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        scene.spawn_renderer(
            "Behind",
            Transform::from_translation(Vec3::new(0.0, 0.0, 30.0)),
            MeshRenderer::opaque(unit_box()),
        );

        let params = scene.culling_parameters(&camera()).unwrap();
        let result = scene.cull(&params);
        let ids: Vec<_> = result.visible_renderers.iter().map(|r| r.id).collect();
        assert_eq!(ids, [Scene::renderer_id(front)]);
    }

    #[test]
    fn lights_are_culled_by_range_and_directional_always_visible() {
        let mut scene = Scene::new();
        scene.spawn_light(
            Light::new("Sun", LightKind::Directional, Vec3::ONE, 1.0),
            Transform::from_translation(Vec3::new(0.0, 0.0, 500.0)),
        );
        scene.spawn_light(
            Light::new("Near", LightKind::Point { range: 2.0 }, Vec3::ONE, 1.0),
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        );
        scene.spawn_light(
            Light::new("Far", LightKind::Point { range: 2.0 }, Vec3::ONE, 1.0),
            Transform::from_translation(Vec3::new(0.0, 0.0, 40.0)),
        );
        scene.spawn_light(
            Light::new("Baked", LightKind::Point { range: 3.0 }, Vec3::ONE, 1.0)
                .with_bake_type(BakeType::Baked),
            Transform::IDENTITY,
        );

        let params = scene.culling_parameters(&camera()).unwrap();
        let names: Vec<_> = scene
            .cull(&params)
            .visible_lights
            .into_iter()
            .map(|l| l.light.name)
            .collect();
        assert_eq!(names, ["Sun", "Near", "Baked"]);
    }

    #[test]
    fn disabled_and_empty_cameras_fail_culling() {
        let scene = Scene::new();
        let mut disabled = camera();
        disabled.enabled = false;
        assert!(matches!(
            scene.culling_parameters(&disabled),
            Err(PipelineError::CullingFailed { .. })
        ));

        let mut empty = camera();
        empty.pixel_size = UVec2::new(0, 0);
        assert!(scene.culling_parameters(&empty).is_err());
    }

    #[test]
    fn hidden_entities_are_not_visible() {
        let mut scene = Scene::new();
        let entity = scene.spawn_renderer("Box", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        assert!(scene.set_visible(entity, false));
        let params = scene.culling_parameters(&camera()).unwrap();
        assert!(scene.cull(&params).visible_renderers.is_empty());
    }

    #[test]
    fn renderer_bounds_follow_transform() {
        let mut scene = Scene::new();
        let entity = scene.spawn_renderer("Box", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        scene.set_transform(entity, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));

        let bounds = scene.renderer_bounds(Scene::renderer_id(entity)).unwrap();
        assert!(bounds.center().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        assert!(bounds.size().abs_diff_eq(Vec3::ONE, 1e-5));

        scene.world.despawn(entity).unwrap();
        assert!(scene.renderer_bounds(Scene::renderer_id(entity)).is_none());
    }

    #[test]
    fn shadow_caster_lifecycle_updates_registry() {
        let mut scene = Scene::new();
        let mut registry = ShadowCasterRegistry::new();
        let a = scene.spawn_renderer("A", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        let b = scene.spawn_renderer("B", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));

        assert_eq!(scene.enable_shadow_caster(a, 1.0, &mut registry), Some(0));
        assert_eq!(scene.enable_shadow_caster(b, 0.5, &mut registry), Some(1));
        assert!(scene.world.get::<&ShadowCasterComponent>(a).is_ok());

        assert!(scene.disable_shadow_caster(a, &mut registry));
        assert!(scene.world.get::<&ShadowCasterComponent>(a).is_err());
        assert_eq!(registry.slot_of(Scene::renderer_id(b)), Some(0));

        assert!(scene.despawn(b, &mut registry));
        assert!(registry.is_empty());
    }

    #[test]
    fn despawn_releases_slot_registered_directly() {
        let mut scene = Scene::new();
        let mut registry = ShadowCasterRegistry::new();
        let a = scene.spawn_renderer("A", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        let b = scene.spawn_renderer("B", Transform::IDENTITY, MeshRenderer::opaque(unit_box()));
        assert_eq!(registry.register(Scene::renderer_id(a), 1.0), Some(0));
        assert_eq!(registry.register(Scene::renderer_id(b), 1.0), Some(1));

        assert!(scene.despawn(a, &mut registry));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.slot_of(Scene::renderer_id(b)), Some(0));
        assert!(registry.properties().block(Scene::renderer_id(a)).is_none());
    }

    #[test]
    fn respawned_casters_do_not_accumulate_properties() {
        let mut scene = Scene::new();
        let mut registry = ShadowCasterRegistry::new();
        for i in 0..100 {
            let entity = scene.spawn_renderer(
                format!("Cube {}", i),
                Transform::IDENTITY,
                MeshRenderer::opaque(unit_box()),
            );
            assert_eq!(scene.enable_shadow_caster(entity, 0.5, &mut registry), Some(0));
            assert!(scene.despawn(entity, &mut registry));
        }
        assert!(registry.is_empty());
        assert!(registry.properties().is_empty());
    }

    #[test]
    fn lights_cannot_cast_renderer_shadows() {
        let mut scene = Scene::new();
        let mut registry = ShadowCasterRegistry::new();
        let light = scene.spawn_light(
            Light::new("Sun", LightKind::Directional, Vec3::ONE, 1.0),
            Transform::IDENTITY,
        );
        assert_eq!(scene.enable_shadow_caster(light, 1.0, &mut registry), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn lightmap_refresh_toggles_baked_flag() {
        let mut scene = Scene::new();
        let entity = scene.spawn_renderer(
            "Floor",
            Transform::IDENTITY,
            MeshRenderer::opaque(unit_box()).with_lightmap(0),
        );
        let layers = |scene: &Scene| scene.world.get::<&MeshRenderer>(entity).unwrap().rendering_layers;
        assert!(layers(&scene).contains(RenderLayers::BAKED_LIGHTMAPS | RenderLayers::CASTS_SHADOWS));

        scene.set_lightmap(entity, None);
        assert_eq!(scene.refresh_render_layers(), 1);
        assert!(!layers(&scene).contains(RenderLayers::BAKED_LIGHTMAPS));
        assert!(layers(&scene).contains(RenderLayers::RECEIVES_SHADOWS));
    }
}
