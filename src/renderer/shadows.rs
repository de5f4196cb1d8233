use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2, Vec3, Vec4};

use crate::renderer::casters::{ShadowCasterRegistry, MAX_SHADOW_CASTERS};
use crate::renderer::commands::{
    CommandBuffer, FilterMode, RenderTarget, RenderTextureDescriptor, TextureFormat, Viewport,
};
use crate::renderer::context::CullingService;
use crate::renderer::lights::{LightKind, VisibleLight};
use crate::renderer::shader_lib::{globals, keywords, passes};
use crate::scene::{look_rotation, Aabb};

pub const SHADOW_NEAR_CLIP: f32 = 0.01;
const SHADOW_ASPECT: f32 = 1.0;

/// Light-space view and projection framing one caster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowFrustum {
    /// World to light view space, Z row flipped so the light looks down -Z.
    pub view: Mat4,
    pub projection: Mat4,
    pub near: f32,
    pub far: f32,
    pub orthographic: bool,
    /// `1 / far`, used by shaders to normalise shadow-space depth.
    pub distance: f32,
}

impl ShadowFrustum {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Position and facing of the virtual shadow camera for `light` and `bounds`.
pub fn shadow_camera_placement(light: &VisibleLight, bounds: &Aabb) -> (Vec3, glam::Quat) {
    if light.light.kind.casts_orthographic_shadows() {
        let forward = light.forward();
        let position = match light.light.kind {
            LightKind::Area { .. } => light.position(),
            _ => bounds.center() - forward * bounds.extents().length(),
        };
        (position, look_rotation(forward, Vec3::Y))
    } else {
        let position = light.position();
        (position, look_rotation(bounds.center() - position, Vec3::Y))
    }
}

/// Builds the tightest frustum around `bounds` as seen from `light`.
///
/// Directional and area lights get an orthographic projection whose half size
/// is half the light-space height of the bounds plus `padding`; other lights
/// get a perspective projection spanning the light-space bounds corners. Zero
/// volume bounds give a degenerate frustum.
pub fn build_shadow_frustum(light: &VisibleLight, bounds: &Aabb, padding: f32) -> ShadowFrustum {
    let kind = light.light.kind;
    let orthographic = kind.casts_orthographic_shadows();

    let (position, rotation) = shadow_camera_placement(light, bounds);
    let world_to_shadow = Mat4::from_rotation_translation(rotation, position).inverse();

    let light_bounds = bounds.transformed(&world_to_shadow);
    let (min, max) = (light_bounds.min, light_bounds.max);

    let near = SHADOW_NEAR_CLIP;
    let far = kind.range().unwrap_or(max.z);

    let projection = if orthographic {
        let size = 0.5 * (max.y - min.y) + padding;
        Mat4::orthographic_rh(
            -SHADOW_ASPECT * size,
            SHADOW_ASPECT * size,
            -size,
            size,
            near,
            far,
        )
    } else {
        let fov = max.angle_between(min);
        Mat4::perspective_rh(fov, SHADOW_ASPECT, near, far)
    };

    // The graphics API looks down -Z, light space looks down +Z.
    let view = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0)) * world_to_shadow;

    ShadowFrustum {
        view,
        projection,
        near,
        far,
        orthographic,
        distance: 1.0 / far,
    }
}

/// Square shadow texture split into one quadrant per caster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowAtlas {
    size: u32,
}

impl ShadowAtlas {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(2) }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn descriptor(&self) -> RenderTextureDescriptor {
        RenderTextureDescriptor::new(UVec2::splat(self.size), TextureFormat::RgHalf, 24)
            .with_filter(FilterMode::Bilinear)
    }

    pub fn full_viewport(&self) -> Viewport {
        Viewport::full(UVec2::splat(self.size))
    }

    /// Pixel rect of a slot: 0 at the origin, 1 above it, 2 to its right, 3 diagonal.
    pub fn quadrant(&self, slot: usize) -> Viewport {
        let half = self.size as f32 * 0.5;
        let (x, y) = match slot % MAX_SHADOW_CASTERS {
            0 => (0.0, 0.0),
            1 => (0.0, half),
            2 => (half, 0.0),
            _ => (half, half),
        };
        Viewport::new(x, y, half, half)
    }
}

/// Shadow data for one camera, indexed by caster slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowFrame {
    pub matrices: [Mat4; MAX_SHADOW_CASTERS],
    pub distances: [f32; MAX_SHADOW_CASTERS],
    pub biases: [f32; MAX_SHADOW_CASTERS],
    pub intensity: f32,
    /// Live casters in the registry.
    pub count: usize,
    /// Casters actually drawn into the atlas.
    pub drawn: usize,
    pub orthographic: bool,
}

impl ShadowFrame {
    pub fn empty(intensity: f32, orthographic: bool) -> Self {
        Self {
            matrices: [Mat4::ZERO; MAX_SHADOW_CASTERS],
            distances: [0.0; MAX_SHADOW_CASTERS],
            biases: [0.0; MAX_SHADOW_CASTERS],
            intensity,
            count: 0,
            drawn: 0,
            orthographic,
        }
    }

    pub fn upload(&self, cmd: &mut CommandBuffer) {
        cmd.set_global_float(globals::SHADOW_INTENSITY, self.intensity);
        cmd.set_global_vector(globals::SHADOW_BIASES, Vec4::from_array(self.biases));
        cmd.set_global_vector(globals::SHADOW_DISTANCES, Vec4::from_array(self.distances));
        cmd.set_global_float(globals::SHADOW_COUNT, self.count as f32);
        cmd.set_global_matrix_array(globals::SHADOW_MATRICES, self.matrices.to_vec());
    }

    pub fn to_uniform(&self) -> ShadowsUniform {
        ShadowsUniform {
            matrices: self.matrices.map(|m| m.to_cols_array_2d()),
            distances: self.distances,
            biases: self.biases,
            params: [
                self.intensity,
                self.count as f32,
                if self.orthographic { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ShadowsUniform {
    pub matrices: [[[f32; 4]; 4]; MAX_SHADOW_CASTERS],
    pub distances: [f32; 4],
    pub biases: [f32; 4],
    /// intensity, count, orthographic flag, unused
    pub params: [f32; 4],
}

impl ShadowsUniform {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Records the atlas render for every registered caster and the shadow globals.
pub fn record_shadow_pass(
    cmd: &mut CommandBuffer,
    atlas: &ShadowAtlas,
    registry: &ShadowCasterRegistry,
    culling: &impl CullingService,
    shadow_light: &VisibleLight,
) -> ShadowFrame {
    let orthographic = shadow_light.light.kind.casts_orthographic_shadows();
    let mut frame = ShadowFrame::empty(shadow_light.light.shadow_strength, orthographic);
    frame.count = registry.len();

    cmd.get_temporary_rt(globals::SHADOW_TEX, atlas.descriptor());
    cmd.set_render_target(RenderTarget::Temporary(globals::SHADOW_TEX));
    cmd.set_viewport(atlas.full_viewport());
    cmd.clear_render_target(true, true, Vec4::ZERO);
    cmd.set_keyword(keywords::SHADOW_PROJECTION_ORTHO, orthographic);

    for caster in registry.casters().iter().take(MAX_SHADOW_CASTERS) {
        let slot = caster.slot();
        let Some(bounds) = culling.renderer_bounds(caster.renderer) else {
            log::warn!(
                "Shadow caster {:?} in slot {} has no bounds; skipping",
                caster.renderer,
                slot
            );
            continue;
        };

        let frustum = build_shadow_frustum(shadow_light, &bounds, caster.padding);
        cmd.set_view_projection_matrices(frustum.view, frustum.projection);
        cmd.set_viewport(atlas.quadrant(slot));
        cmd.draw_renderer(caster.renderer, passes::SHADOW_PASS_ID);

        frame.matrices[slot] = frustum.view_projection();
        frame.distances[slot] = if orthographic { 0.0 } else { frustum.distance };
        frame.biases[slot] = shadow_light.light.shadow_bias;
        frame.drawn += 1;
    }

    frame.upload(cmd);
    log::trace!(
        "Shadow pass for '{}': {} of {} casters drawn",
        shadow_light.light.name,
        frame.drawn,
        frame.count
    );
    frame
}
