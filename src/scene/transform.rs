use glam::{Mat3, Mat4, Quat, Vec3};

/// World placement of a scene object.
///
/// Objects face along their local +Z axis; `forward()` is that axis in world
/// space. Light-space and shadow-space math build on the same convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_trs(t: Vec3, r: Quat, s: Vec3) -> Self {
        Self {
            translation: t,
            rotation: r,
            scale: s,
        }
    }

    pub fn from_translation(t: Vec3) -> Self {
        Self {
            translation: t,
            ..Self::IDENTITY
        }
    }

    /// Placement at `position` facing along `forward`, using world up to fix roll.
    pub fn looking_along(position: Vec3, forward: Vec3) -> Self {
        Self {
            translation: position,
            rotation: look_rotation(forward, Vec3::Y),
            scale: Vec3::ONE,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// Rotation whose +Z axis points along `forward` and whose +Y axis leans towards `up`.
///
/// When `forward` is (anti)parallel to `up` a perpendicular fallback up axis is used.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = safe_normalize(forward, Vec3::Z);
    let mut right = up.cross(f);
    if right.length_squared() < 1e-8 {
        let fallback = if f.dot(Vec3::Z).abs() < 0.9 {
            Vec3::Z
        } else {
            Vec3::X
        };
        right = fallback.cross(f);
    }
    let right = right.normalize();
    let up = f.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, f))
}

pub fn safe_normalize(vec: Vec3, fallback: Vec3) -> Vec3 {
    if vec.length_squared() > 1e-6 {
        vec.normalize()
    } else {
        fallback
    }
}
