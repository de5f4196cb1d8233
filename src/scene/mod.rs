// scene/mod.rs

pub mod bounds;
pub mod camera;
pub mod components;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use bounds::Aabb;
pub use camera::Camera;
pub use scene::{Frustum, Scene};
pub use transform::{look_rotation, safe_normalize, Transform};

// Re-export all components
pub use components::{
    LightComponent, MeshRenderer, Name, ShadowCasterComponent, TransformComponent, Visible,
};

/// Stable handle of a renderable object, as seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub u64);
