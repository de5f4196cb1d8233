// scene/components.rs
// Pure hecs components - no custom entity system

use crate::renderer::lights::Light;
use crate::renderer::shader_lib::{queues, RenderLayers};
use crate::scene::{Aabb, Transform};

// ============================================================================
// Core Components
// ============================================================================

/// Transform component (position, rotation, scale)
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent(pub Transform);

/// Visibility component; entities without one are visible.
#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

// ============================================================================
// Rendering Components
// ============================================================================

#[derive(Debug, Clone)]
pub struct LightComponent(pub Light);

/// A drawable object as seen by culling and pass filtering.
#[derive(Debug, Clone, Copy)]
pub struct MeshRenderer {
    /// Bounds in object space.
    pub local_bounds: Aabb,
    pub render_queue: i32,
    /// Object layer index (0..32).
    pub layer: u32,
    pub rendering_layers: RenderLayers,
    pub lightmap_index: Option<u32>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl MeshRenderer {
    pub fn opaque(local_bounds: Aabb) -> Self {
        Self {
            local_bounds,
            render_queue: queues::GEOMETRY,
            layer: 0,
            rendering_layers: RenderLayers::empty(),
            lightmap_index: None,
            cast_shadows: true,
            receive_shadows: true,
        }
    }

    pub fn transparent(local_bounds: Aabb) -> Self {
        Self {
            render_queue: queues::TRANSPARENT,
            cast_shadows: false,
            ..Self::opaque(local_bounds)
        }
    }

    pub fn with_lightmap(mut self, index: u32) -> Self {
        self.lightmap_index = Some(index);
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Recomputes the renderer-layer bits from the renderer's own state.
    pub fn refresh_layers(&mut self) {
        self.rendering_layers
            .set(RenderLayers::BAKED_LIGHTMAPS, self.lightmap_index.is_some());
        self.rendering_layers
            .set(RenderLayers::CASTS_SHADOWS, self.cast_shadows);
        self.rendering_layers
            .set(RenderLayers::RECEIVES_SHADOWS, self.receive_shadows);
    }
}

/// Marks a renderer as registered for the shadow atlas.
#[derive(Debug, Clone, Copy)]
pub struct ShadowCasterComponent {
    /// World-space margin added around the caster's shadow frustum.
    pub padding: f32,
}

impl Default for ShadowCasterComponent {
    fn default() -> Self {
        Self { padding: 1.0 }
    }
}
