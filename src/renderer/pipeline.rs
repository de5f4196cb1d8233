use glam::{UVec2, Vec4};

use crate::environment::Environment;
use crate::renderer::casters::ShadowCasterRegistry;
use crate::renderer::commands::{CommandBuffer, RenderTarget, RenderTextureDescriptor, TextureFormat};
use crate::renderer::context::{CullingParameters, CullingService, RenderContext, VisibleRenderer};
use crate::renderer::light_collector::LightCollector;
use crate::renderer::passes::{PassDescriptor, OPAQUE_PASSES, TRANSPARENT_PASS};
use crate::renderer::shader_lib::globals;
use crate::renderer::shadows::{record_shadow_pass, ShadowAtlas, ShadowFrame};
use crate::scene::Camera;
use crate::settings::PipelineSettings;

const FRAMEBUFFER_DEPTH_BITS: u32 = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub cameras_rendered: u32,
    pub cameras_skipped: u32,
    pub lights_packed: u32,
    pub shadow_casters_drawn: u32,
    /// Filtered `draw_renderers` submissions (one per pass per camera).
    pub draw_renderer_calls: u32,
}

impl FrameStats {
    pub fn total_draw_calls(&self) -> u32 {
        self.draw_renderer_calls + self.shadow_casters_drawn
    }
}

/// Per-camera result, kept for callers that want more than the counters.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraFrame {
    pub camera: String,
    pub lights_packed: usize,
    pub shadows: Option<ShadowFrame>,
}

/// Forward renderer front end: owns the caster registry and records one
/// frame for a list of cameras into a [`RenderContext`].
pub struct FramePipeline {
    settings: PipelineSettings,
    registry: ShadowCasterRegistry,
    collector: LightCollector,
    atlas: ShadowAtlas,
    last_frame: Vec<CameraFrame>,
}

impl FramePipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        let settings = settings.validate();
        log::info!(
            "Forward pipeline: render scale {}, {} lights, {}px shadow atlas",
            settings.render_scale,
            settings.max_lights,
            settings.shadow_map_size
        );
        Self {
            collector: LightCollector::new(settings.max_lights, settings.mixed_light_alpha),
            atlas: ShadowAtlas::new(settings.shadow_map_size),
            registry: ShadowCasterRegistry::new(),
            last_frame: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Replaces the settings; the caster registry is kept.
    pub fn apply_settings(&mut self, settings: PipelineSettings) {
        let settings = settings.validate();
        self.collector = LightCollector::new(settings.max_lights, settings.mixed_light_alpha);
        self.atlas = ShadowAtlas::new(settings.shadow_map_size);
        self.settings = settings;
    }

    pub fn registry(&self) -> &ShadowCasterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShadowCasterRegistry {
        &mut self.registry
    }

    pub fn atlas(&self) -> &ShadowAtlas {
        &self.atlas
    }

    pub fn last_frame(&self) -> &[CameraFrame] {
        &self.last_frame
    }

    /// Size of the offscreen colour target for `camera`.
    pub fn framebuffer_size(&self, camera: &Camera) -> UVec2 {
        (camera.pixel_size.as_vec2() * self.settings.render_scale)
            .floor()
            .as_uvec2()
            .max(UVec2::ONE)
    }

    /// Records one frame. Cameras that fail culling are skipped.
    pub fn render(
        &mut self,
        context: &mut impl RenderContext,
        scene: &impl CullingService,
        environment: &Environment,
        cameras: &[Camera],
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        self.last_frame.clear();

        upload_environment(context, environment);

        for camera in cameras {
            match self.render_camera(context, scene, camera, &mut stats) {
                Some(frame) => {
                    stats.cameras_rendered += 1;
                    self.last_frame.push(frame);
                }
                None => stats.cameras_skipped += 1,
            }
        }

        log::trace!("Frame recorded: {:?}", stats);
        stats
    }

    fn render_camera(
        &self,
        context: &mut impl RenderContext,
        scene: &impl CullingService,
        camera: &Camera,
        stats: &mut FrameStats,
    ) -> Option<CameraFrame> {
        let params = scene.culling_parameters(camera).ok()?;
        let mut cull = scene.cull(&params);

        let collected = self.collector.collect(
            &mut cull.visible_lights,
            &camera.view(),
            params.camera_position,
        );
        let mut cmd = CommandBuffer::new("Setup Light Buffers");
        collected.buffer.upload(&mut cmd);
        context.execute_command_buffer(&cmd);
        stats.lights_packed += collected.buffer.count as u32;

        let shadows = collected.shadow_light.as_ref().map(|shadow_light| {
            let mut cmd = CommandBuffer::new("Collect Shadows");
            let frame = record_shadow_pass(&mut cmd, &self.atlas, &self.registry, scene, shadow_light);
            context.execute_command_buffer(&cmd);
            frame
        });
        if let Some(frame) = &shadows {
            stats.shadow_casters_drawn += frame.drawn as u32;
        }

        context.setup_camera_properties(camera);

        let descriptor = RenderTextureDescriptor::new(
            self.framebuffer_size(camera),
            TextureFormat::Default,
            FRAMEBUFFER_DEPTH_BITS,
        );
        let mut cmd = CommandBuffer::new("Clear Framebuffer");
        cmd.get_temporary_rt(globals::FRAMEBUFFER, descriptor);
        cmd.set_render_target(RenderTarget::Temporary(globals::FRAMEBUFFER));
        cmd.clear_render_target(true, true, Vec4::ZERO);
        context.execute_command_buffer(&cmd);

        for pass in &OPAQUE_PASSES {
            self.draw_pass(context, &cull.visible_renderers, pass, &params);
            stats.draw_renderer_calls += 1;
        }
        context.draw_skybox(camera);
        self.draw_pass(context, &cull.visible_renderers, &TRANSPARENT_PASS, &params);
        stats.draw_renderer_calls += 1;

        let mut cmd = CommandBuffer::new("Blit Framebuffer");
        cmd.blit(
            RenderTarget::Temporary(globals::FRAMEBUFFER),
            RenderTarget::CameraTarget,
        );
        cmd.release_temporary_rt(globals::FRAMEBUFFER);
        if shadows.is_some() {
            cmd.release_temporary_rt(globals::SHADOW_TEX);
        }
        context.execute_command_buffer(&cmd);

        context.submit();

        Some(CameraFrame {
            camera: camera.name.clone(),
            lights_packed: collected.buffer.count,
            shadows,
        })
    }

    fn draw_pass(
        &self,
        context: &mut impl RenderContext,
        renderers: &[VisibleRenderer],
        pass: &PassDescriptor,
        params: &CullingParameters,
    ) {
        context.draw_renderers(
            renderers,
            &pass.draw_settings(params.camera_position),
            &pass.filter_settings(params.culling_mask),
            self.registry.properties(),
        );
    }
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new(PipelineSettings::default())
    }
}

fn upload_environment(context: &mut impl RenderContext, environment: &Environment) {
    let mut cmd = CommandBuffer::new("Build Environment CBuffer");
    cmd.set_global_vector(globals::AMBIENT_SKY, environment.ambient_sky);
    cmd.set_global_vector(globals::AMBIENT_HORIZON, environment.ambient_equator);
    cmd.set_global_vector(globals::AMBIENT_GROUND, environment.ambient_ground);
    cmd.set_global_vector(globals::FOG_PARAMS, environment.fog_params());
    cmd.set_global_vector(globals::FOG_COLOR, environment.fog_color);
    context.execute_command_buffer(&cmd);
}
