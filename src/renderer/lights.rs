use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::renderer::commands::CommandBuffer;
use crate::renderer::shader_lib::globals;
use crate::scene::Transform;

/// Upper bound for the configurable realtime light cap.
pub const MAX_LIGHTS: usize = 8;

/// Light kinds with the parameters each one actually uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Directional,
    Point { range: f32 },
    /// `angle` is the full cone angle in degrees.
    Spot { range: f32, angle: f32 },
    /// Classified for shadows only; there is no realtime packing for area lights.
    /// `size` is carried for baking and is not read by the realtime path.
    Area { range: f32, size: glam::Vec2 },
}

impl LightKind {
    pub fn range(&self) -> Option<f32> {
        match *self {
            Self::Directional => None,
            Self::Point { range } | Self::Spot { range, .. } | Self::Area { range, .. } => {
                Some(range)
            }
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self, Self::Directional)
    }

    /// Directional and area lights get orthographic shadow projections.
    pub fn casts_orthographic_shadows(&self) -> bool {
        matches!(self, Self::Directional | Self::Area { .. })
    }
}

/// How a light's contribution reaches the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BakeType {
    #[default]
    Realtime,
    /// Diffuse baked into lightmaps, specular and dynamic objects lit in realtime.
    Mixed,
    /// Lightmaps only; never enters the realtime buffer.
    Baked,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    /// Linear colour.
    pub color: Vec3,
    pub intensity: f32,
    pub shadows: bool,
    pub shadow_strength: f32,
    pub shadow_bias: f32,
    pub bake_type: BakeType,
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind, color: Vec3, intensity: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            color,
            intensity,
            shadows: false,
            shadow_strength: 1.0,
            shadow_bias: 0.05,
            bake_type: BakeType::Realtime,
        }
    }

    pub fn with_shadows(mut self, strength: f32, bias: f32) -> Self {
        self.shadows = true;
        self.shadow_strength = strength;
        self.shadow_bias = bias;
        self
    }

    pub fn with_bake_type(mut self, bake_type: BakeType) -> Self {
        self.bake_type = bake_type;
        self
    }

    /// Colour at current intensity, alpha 1.
    pub fn final_color(&self) -> Vec4 {
        (self.color * self.intensity).extend(1.0)
    }
}

/// A light that survived culling, with its world placement.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleLight {
    pub light: Light,
    pub transform: Transform,
}

impl VisibleLight {
    pub fn new(light: Light, transform: Transform) -> Self {
        Self { light, transform }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }
}

/// Per-camera realtime light data in the layout the shaders read.
///
/// All four arrays always hold `capacity` entries; unused slots stay zero.
#[derive(Clone, Debug, PartialEq)]
pub struct LightBuffer {
    pub colors: Vec<Vec4>,
    pub positions: Vec<Vec4>,
    pub attenuations: Vec<Vec4>,
    pub spot_directions: Vec<Vec4>,
    pub count: usize,
}

impl LightBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: vec![Vec4::ZERO; capacity],
            positions: vec![Vec4::ZERO; capacity],
            attenuations: vec![Vec4::ZERO; capacity],
            spot_directions: vec![Vec4::ZERO; capacity],
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.colors.len()
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity()
    }

    /// Writes `light` into the next slot. Returns false when the buffer is full.
    pub fn push(&mut self, light: PackedLight) -> bool {
        if self.is_full() {
            return false;
        }
        let slot = self.count;
        self.colors[slot] = light.color;
        self.positions[slot] = light.position;
        self.attenuations[slot] = light.attenuation;
        self.spot_directions[slot] = light.spot_direction;
        self.count += 1;
        true
    }

    pub fn get(&self, slot: usize) -> Option<PackedLight> {
        (slot < self.count).then(|| PackedLight {
            color: self.colors[slot],
            position: self.positions[slot],
            attenuation: self.attenuations[slot],
            spot_direction: self.spot_directions[slot],
        })
    }

    /// Records the global uploads for the four arrays and the live count.
    pub fn upload(&self, cmd: &mut CommandBuffer) {
        cmd.set_global_vector_array(globals::LIGHTS_COLOR, self.colors.clone());
        cmd.set_global_vector_array(globals::LIGHTS_POSITION, self.positions.clone());
        cmd.set_global_vector_array(globals::LIGHTS_ATTEN, self.attenuations.clone());
        cmd.set_global_vector_array(globals::LIGHTS_SPOT_DIRS, self.spot_directions.clone());
        cmd.set_global_vector(
            globals::LIGHTS_COUNT,
            Vec4::new(self.count as f32, 0.0, 0.0, 0.0),
        );
    }

    pub fn to_uniform(&self) -> LightsUniform {
        LightsUniform::from_buffer(self)
    }
}

/// One packed slot of the light buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PackedLight {
    pub color: Vec4,
    pub position: Vec4,
    pub attenuation: Vec4,
    pub spot_direction: Vec4,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    pub colors: [[f32; 4]; MAX_LIGHTS],
    pub positions: [[f32; 4]; MAX_LIGHTS],
    pub attenuations: [[f32; 4]; MAX_LIGHTS],
    pub spot_directions: [[f32; 4]; MAX_LIGHTS],
    pub count: [u32; 4],
}

impl LightsUniform {
    pub fn from_buffer(buffer: &LightBuffer) -> Self {
        let mut uniform = Self::zeroed();
        let count = buffer.count.min(MAX_LIGHTS);
        uniform.count[0] = count as u32;

        for slot in 0..count {
            uniform.colors[slot] = buffer.colors[slot].to_array();
            uniform.positions[slot] = buffer.positions[slot].to_array();
            uniform.attenuations[slot] = buffer.attenuations[slot].to_array();
            uniform.spot_directions[slot] = buffer.spot_directions[slot].to_array();
        }

        uniform
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
