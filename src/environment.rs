use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Scene-wide ambient and fog settings uploaded once per frame.
///
/// Colours are linear RGBA. Fog is linear between `fog_start` and `fog_end`
/// (distances from the camera).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub ambient_sky: Vec4,
    pub ambient_equator: Vec4,
    pub ambient_ground: Vec4,
    pub fog_color: Vec4,
    pub fog_start: f32,
    pub fog_end: f32,
}

impl Environment {
    /// Fog parameters as uploaded: `(start, end, 0, 0)`.
    pub fn fog_params(&self) -> Vec4 {
        Vec4::new(self.fog_start, self.fog_end, 0.0, 0.0)
    }

    pub fn with_fog(mut self, color: Vec4, start: f32, end: f32) -> Self {
        self.fog_color = color;
        self.fog_start = start;
        self.fog_end = end;
        self
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient_sky: Vec4::new(0.212, 0.227, 0.259, 1.0),
            ambient_equator: Vec4::new(0.114, 0.125, 0.133, 1.0),
            ambient_ground: Vec4::new(0.047, 0.043, 0.035, 1.0),
            fog_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            fog_start: 0.0,
            fog_end: 300.0,
        }
    }
}
