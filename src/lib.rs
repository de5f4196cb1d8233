pub mod environment;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use environment::Environment;
pub use error::{PipelineError, Result};
pub use renderer::{FramePipeline, FrameStats, RecordingContext};
pub use settings::{MixedLightAlpha, PipelineSettings};

/// Installs `env_logger` with an `info` default; `RUST_LOG` still overrides it.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
