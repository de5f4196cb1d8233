//! Names shared with the shader code.
//!
//! These strings are the contract between the pipeline and the shaders; changing
//! one here without changing the shader side silently breaks lighting.

use bitflags::bitflags;

bitflags! {
    /// Per-renderer flags routing objects into draw passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderLayers: u32 {
        const RECEIVES_SHADOWS = 1;
        const CASTS_SHADOWS = 1 << 1;
        const BAKED_LIGHTMAPS = 1 << 2;
    }
}

pub mod globals {
    // Light buffer
    pub const LIGHTS_COLOR: &str = "globalLightColors";
    pub const LIGHTS_POSITION: &str = "globalLightPositions";
    pub const LIGHTS_ATTEN: &str = "globalLightAtten";
    pub const LIGHTS_SPOT_DIRS: &str = "globalLightSpotDirs";
    pub const LIGHTS_COUNT: &str = "globalLightCount";

    // Environment
    pub const AMBIENT_SKY: &str = "ambientLightSky";
    pub const AMBIENT_HORIZON: &str = "ambientLightHorizon";
    pub const AMBIENT_GROUND: &str = "ambientLightGround";
    pub const FOG_PARAMS: &str = "fogParams";
    pub const FOG_COLOR: &str = "fogColor";

    // Shadows
    pub const SHADOW_TEX: &str = "shadowTexture";
    pub const SHADOW_MATRICES: &str = "shadowMatrices";
    pub const SHADOW_COUNT: &str = "shadowCount";
    pub const SHADOW_DISTANCES: &str = "shadowDistances";
    pub const SHADOW_BIASES: &str = "shadowBiases";
    pub const SHADOW_INTENSITY: &str = "shadowIntensity";

    pub const FRAMEBUFFER: &str = "_TempFrameBuffer";
}

pub mod renderer {
    /// Slot bit of a shadow caster, 0 for renderers without a shadow slot.
    pub const SHADOW_INDEX: &str = "shadowIndex";
}

pub mod passes {
    pub const BASE_PASS: &str = "BasePass";
    pub const MIXED: &str = "Mixed";
    pub const MIXED_REFLECTIVE: &str = "MixedReflective";
    pub const DYNAMIC: &str = "Dynamic";
    pub const DYNAMIC_REFLECTIVE: &str = "DynamicReflective";
    pub const TRANSPARENT: &str = "Transparent";
    pub const ZPRIME: &str = "ZPrime";

    /// Pass index of the depth pass in the shadow material.
    pub const SHADOW_PASS_ID: u32 = 0;
}

pub mod keywords {
    pub const SHADOW_PROJECTION_ORTHO: &str = "SHADOW_PROJECTION_ORTHO";
}

pub mod queues {
    pub const BACKGROUND: i32 = 1000;
    pub const GEOMETRY: i32 = 2000;
    pub const ALPHA_TEST: i32 = 2450;
    /// Last queue value still considered opaque.
    pub const GEOMETRY_LAST: i32 = 2500;
    pub const TRANSPARENT: i32 = 3000;
    pub const OVERLAY: i32 = 4000;
    pub const MAX: i32 = 5000;
}
