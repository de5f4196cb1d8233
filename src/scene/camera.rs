use glam::{Mat4, UVec2, Vec3};

#[derive(Clone, Debug)]
pub struct Camera {
    pub name: String,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    /// Pixel size of the camera's target.
    pub pixel_size: UVec2,
    /// Object layers this camera renders (bit per layer).
    pub culling_mask: u32,
    pub enabled: bool,
}

impl Camera {
    pub fn new(name: impl Into<String>, eye: Vec3, target: Vec3) -> Self {
        Self {
            name: name.into(),
            eye,
            target,
            ..Self::default()
        }
    }

    /// World-to-camera matrix; view space looks down -Z.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn aspect(&self) -> f32 {
        self.pixel_size.x as f32 / self.pixel_size.y.max(1) as f32
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect(), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }

    pub fn has_viewport_area(&self) -> bool {
        self.pixel_size.x > 0 && self.pixel_size.y > 0
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: "Main Camera".to_string(),
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
            pixel_size: UVec2::new(1280, 720),
            culling_mask: u32::MAX,
            enabled: true,
        }
    }
}
