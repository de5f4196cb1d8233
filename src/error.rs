use thiserror::Error;

use crate::renderer::lights::LightKind;

/// Failures raised inside the pipeline's components.
///
/// None of these escape a frame; the pipeline logs them and renders on with
/// less (no shadow, a dark light slot, or one camera fewer).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// All shadow atlas slots are taken.
    #[error(
        "There are already the maximum allowed active shadow casters in the scene ({capacity}). \
         Remove or disable one of the other shadow casters first before adding another."
    )]
    ShadowCasterCapacity { capacity: usize },

    /// The light kind has no packing formula.
    #[error("Unsupported light type '{kind:?}' on light '{light}'")]
    UnsupportedLightType { light: String, kind: LightKind },

    /// The camera cannot produce culling parameters this frame.
    #[error("Culling failed for camera '{camera}': {reason}")]
    CullingFailed { camera: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
