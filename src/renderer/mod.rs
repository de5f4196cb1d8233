pub mod casters;
pub mod commands;
pub mod context;
pub mod light_collector;
pub mod lights;
pub mod passes;
pub mod pipeline;
pub mod recording;
pub mod shader_lib;
pub mod shadows;

pub use casters::{ShadowCaster, ShadowCasterRegistry, MAX_SHADOW_CASTERS};
pub use commands::{Command, CommandBuffer, RenderTarget};
pub use context::{CullResults, CullingParameters, CullingService, RenderContext, VisibleRenderer};
pub use light_collector::{CollectedLights, LightCollector};
pub use lights::{BakeType, Light, LightBuffer, LightKind, VisibleLight, MAX_LIGHTS};
pub use pipeline::{CameraFrame, FramePipeline, FrameStats};
pub use recording::RecordingContext;
pub use shader_lib::RenderLayers;
pub use shadows::{build_shadow_frustum, ShadowAtlas, ShadowFrame, ShadowFrustum};
