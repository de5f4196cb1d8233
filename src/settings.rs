use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::lights::MAX_LIGHTS;

/// How the colour alpha of a packed light flags Mixed lights.
///
/// Lightmapped surfaces multiply the light's diffuse term by this alpha so that
/// a Mixed light's baked diffuse is not counted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedLightAlpha {
    /// Mixed lights get alpha 0, every other realtime light alpha 1.
    #[default]
    ZeroForMixed,
    /// Mixed lights get alpha 1, every other realtime light alpha 0.
    OneForMixed,
}

impl MixedLightAlpha {
    pub fn alpha(self, is_mixed: bool) -> f32 {
        match (self, is_mixed) {
            (Self::ZeroForMixed, true) | (Self::OneForMixed, false) => 0.0,
            (Self::ZeroForMixed, false) | (Self::OneForMixed, true) => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Scale of the offscreen frame buffer, 1 is native.
    #[serde(default = "PipelineSettings::default_render_scale")]
    pub render_scale: f32,
    /// Maximum number of realtime lights packed per camera.
    #[serde(default = "PipelineSettings::default_max_lights")]
    pub max_lights: usize,
    /// Edge length of the shadow atlas texture.
    #[serde(default = "PipelineSettings::default_shadow_map_size")]
    pub shadow_map_size: u32,
    #[serde(default)]
    pub mixed_light_alpha: MixedLightAlpha,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            render_scale: Self::default_render_scale(),
            max_lights: Self::default_max_lights(),
            shadow_map_size: Self::default_shadow_map_size(),
            mixed_light_alpha: MixedLightAlpha::default(),
        }
    }
}

impl PipelineSettings {
    pub const MIN_RENDER_SCALE: f32 = 0.1;
    pub const MAX_RENDER_SCALE: f32 = 1.0;

    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => {
                    info!("Loaded pipeline settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default pipeline settings.",
                        path, err
                    );
                    PipelineSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Pipeline settings file {:?} not found. Using default settings.",
                    path
                );
                PipelineSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default pipeline settings.",
                    path, err
                );
                PipelineSettings::default()
            }
        }
    }

    /// Parses and validates settings from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<PipelineSettings>(contents).map(Self::validate)
    }

    pub fn validate(mut self) -> Self {
        if !self.render_scale.is_finite() {
            warn!("Render scale must be finite. Using 1 instead.");
            self.render_scale = Self::default_render_scale();
        } else if !(Self::MIN_RENDER_SCALE..=Self::MAX_RENDER_SCALE).contains(&self.render_scale) {
            let clamped = self
                .render_scale
                .clamp(Self::MIN_RENDER_SCALE, Self::MAX_RENDER_SCALE);
            warn!(
                "Render scale {} is outside [{}, {}]. Using {} instead.",
                self.render_scale,
                Self::MIN_RENDER_SCALE,
                Self::MAX_RENDER_SCALE,
                clamped
            );
            self.render_scale = clamped;
        }

        if !(1..=MAX_LIGHTS).contains(&self.max_lights) {
            let clamped = self.max_lights.clamp(1, MAX_LIGHTS);
            warn!(
                "Max lights {} is outside [1, {}]. Using {} instead.",
                self.max_lights, MAX_LIGHTS, clamped
            );
            self.max_lights = clamped;
        }

        if self.shadow_map_size == 0 {
            warn!("Shadow map size must be greater than zero. Using default value.");
            self.shadow_map_size = Self::default_shadow_map_size();
        }

        self
    }

    const fn default_render_scale() -> f32 {
        1.0
    }

    const fn default_max_lights() -> usize {
        MAX_LIGHTS
    }

    const fn default_shadow_map_size() -> u32 {
        2048
    }
}
