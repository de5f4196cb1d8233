//! Contracts with the host engine.
//!
//! The pipeline never talks to a GPU or a scene graph directly. It records
//! commands into a [`RenderContext`] and asks a [`CullingService`] what is
//! visible.

use glam::Vec3;

use crate::error::Result;
use crate::renderer::commands::CommandBuffer;
use crate::renderer::casters::RendererProperties;
use crate::renderer::lights::VisibleLight;
use crate::renderer::passes::{DrawSettings, FilterSettings};
use crate::renderer::shader_lib::RenderLayers;
use crate::scene::{Aabb, Camera, RendererId};

/// What culling needs to know about one camera.
#[derive(Clone, Debug, PartialEq)]
pub struct CullingParameters {
    pub camera_name: String,
    pub view_proj: glam::Mat4,
    pub camera_position: Vec3,
    pub culling_mask: u32,
}

/// A renderer that survived culling, with everything draw filtering reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleRenderer {
    pub id: RendererId,
    pub render_queue: i32,
    /// Object layer index (0..32), tested against the camera culling mask.
    pub layer: u32,
    pub rendering_layers: RenderLayers,
    pub bounds: Aabb,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CullResults {
    pub visible_lights: Vec<VisibleLight>,
    pub visible_renderers: Vec<VisibleRenderer>,
}

pub trait CullingService {
    /// Fails for cameras that cannot render this frame (disabled, zero-area viewport).
    fn culling_parameters(&self, camera: &Camera) -> Result<CullingParameters>;

    fn cull(&self, params: &CullingParameters) -> CullResults;

    /// Current world-space bounds of a renderer, if it still exists.
    fn renderer_bounds(&self, renderer: RendererId) -> Option<Aabb>;
}

/// Command submission. Calls are recorded in order and executed on `submit`.
pub trait RenderContext {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer);

    /// Binds the camera target and its view/projection matrices.
    fn setup_camera_properties(&mut self, camera: &Camera);

    fn draw_renderers(
        &mut self,
        renderers: &[VisibleRenderer],
        draw: &DrawSettings,
        filter: &FilterSettings,
        properties: &RendererProperties,
    );

    fn draw_skybox(&mut self, camera: &Camera);

    fn submit(&mut self);
}
