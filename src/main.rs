mod demo_scenes;

use demo_scenes::DemoScene;
use forward_pipeline::{FramePipeline, PipelineSettings, RecordingContext};

fn main() {
    forward_pipeline::init_logging();

    let settings = PipelineSettings::load();
    let mut pipeline = FramePipeline::new(settings);
    let active_scene = DemoScene::from_args(std::env::args().skip(1));
    log::info!("Demo scene: {:?}", active_scene);
    let (scene, cameras) = active_scene.build(pipeline.registry_mut());

    let mut context = RecordingContext::new();
    let stats = pipeline.render(&mut context, &scene, &scene.environment, &cameras);

    log::info!(
        "Frame: {} camera(s) rendered, {} skipped, {} lights packed, {} shadow casters, {} draw calls",
        stats.cameras_rendered,
        stats.cameras_skipped,
        stats.lights_packed,
        stats.shadow_casters_drawn,
        stats.total_draw_calls()
    );
    for frame in pipeline.last_frame() {
        if let Some(shadows) = &frame.shadows {
            log::debug!(
                "[{}] shadow atlas: {} of {} casters drawn",
                frame.camera,
                shadows.drawn,
                shadows.count
            );
        }
    }
    for (names, drawn) in context.draw_calls() {
        log::debug!("{:?}: {} renderers", names, drawn.len());
    }
    log::info!(
        "Recorded {} command buffers: {:?}",
        context.command_buffer_names().len(),
        context.command_buffer_names()
    );
}
