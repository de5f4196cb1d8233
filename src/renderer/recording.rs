use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec4};

use crate::renderer::casters::RendererProperties;
use crate::renderer::commands::{Command, CommandBuffer};
use crate::renderer::context::{RenderContext, VisibleRenderer};
use crate::renderer::passes::{filter_and_sort, DrawSettings, FilterSettings, PerObjectData};
use crate::scene::{Camera, RendererId};

#[derive(Clone, Debug, PartialEq)]
pub enum GlobalValue {
    Float(f32),
    Vector(Vec4),
    VectorArray(Vec<Vec4>),
    MatrixArray(Vec<Mat4>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawnRenderer {
    pub id: RendererId,
    pub shadow_index: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContextEvent {
    ExecuteCommandBuffer {
        name: String,
        commands: Vec<Command>,
    },
    SetupCamera {
        camera: String,
    },
    DrawRenderers {
        shader_passes: Vec<&'static str>,
        per_object: PerObjectData,
        drawn: Vec<DrawnRenderer>,
    },
    DrawSkybox {
        camera: String,
    },
    Submit,
}

/// A [`RenderContext`] that keeps every call in memory.
///
/// Global shader state is tracked the way a GPU backend would see it after
/// executing the recorded buffers, so callers can query the values the
/// shaders would read.
#[derive(Debug, Default)]
pub struct RecordingContext {
    events: Vec<ContextEvent>,
    globals: HashMap<&'static str, GlobalValue>,
    keywords: HashSet<&'static str>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ContextEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn global(&self, name: &str) -> Option<&GlobalValue> {
        self.globals.get(name)
    }

    pub fn global_float(&self, name: &str) -> Option<f32> {
        match self.global(name)? {
            GlobalValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn global_vector(&self, name: &str) -> Option<Vec4> {
        match self.global(name)? {
            GlobalValue::Vector(value) => Some(*value),
            _ => None,
        }
    }

    pub fn global_vector_array(&self, name: &str) -> Option<&[Vec4]> {
        match self.global(name)? {
            GlobalValue::VectorArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn global_matrix_array(&self, name: &str) -> Option<&[Mat4]> {
        match self.global(name)? {
            GlobalValue::MatrixArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn keyword_enabled(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    /// Names of the executed command buffers, in order.
    pub fn command_buffer_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ContextEvent::ExecuteCommandBuffer { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every executed command, flattened across buffers.
    pub fn executed_commands(&self) -> impl Iterator<Item = &Command> {
        self.events.iter().flat_map(|event| match event {
            ContextEvent::ExecuteCommandBuffer { commands, .. } => commands.as_slice(),
            _ => &[][..],
        })
    }

    /// Renderers drawn through `DrawRenderer` commands (shadow casters).
    pub fn single_draws(&self) -> Vec<RendererId> {
        self.executed_commands()
            .filter_map(|command| match command {
                Command::DrawRenderer { renderer, .. } => Some(*renderer),
                _ => None,
            })
            .collect()
    }

    pub fn draw_calls(&self) -> impl Iterator<Item = (&[&'static str], &[DrawnRenderer])> {
        self.events.iter().filter_map(|event| match event {
            ContextEvent::DrawRenderers {
                shader_passes,
                drawn,
                ..
            } => Some((shader_passes.as_slice(), drawn.as_slice())),
            _ => None,
        })
    }

    pub fn submit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ContextEvent::Submit))
            .count()
    }

    fn apply(&mut self, command: &Command) {
        match command {
            Command::SetGlobalFloat { name, value } => {
                self.globals.insert(*name, GlobalValue::Float(*value));
            }
            Command::SetGlobalVector { name, value } => {
                self.globals.insert(*name, GlobalValue::Vector(*value));
            }
            Command::SetGlobalVectorArray { name, values } => {
                self.globals
                    .insert(*name, GlobalValue::VectorArray(values.clone()));
            }
            Command::SetGlobalMatrixArray { name, values } => {
                self.globals
                    .insert(*name, GlobalValue::MatrixArray(values.clone()));
            }
            Command::EnableKeyword(keyword) => {
                self.keywords.insert(*keyword);
            }
            Command::DisableKeyword(keyword) => {
                self.keywords.remove(*keyword);
            }
            _ => {}
        }
    }
}

impl RenderContext for RecordingContext {
    fn execute_command_buffer(&mut self, cmd: &CommandBuffer) {
        for command in cmd.commands() {
            self.apply(command);
        }
        self.events.push(ContextEvent::ExecuteCommandBuffer {
            name: cmd.name.clone(),
            commands: cmd.commands().to_vec(),
        });
    }

    fn setup_camera_properties(&mut self, camera: &Camera) {
        self.events.push(ContextEvent::SetupCamera {
            camera: camera.name.clone(),
        });
    }

    fn draw_renderers(
        &mut self,
        renderers: &[VisibleRenderer],
        draw: &DrawSettings,
        filter: &FilterSettings,
        properties: &RendererProperties,
    ) {
        let drawn = filter_and_sort(renderers, draw, filter)
            .into_iter()
            .map(|id| DrawnRenderer {
                id,
                shadow_index: properties.shadow_index(id),
            })
            .collect();

        self.events.push(ContextEvent::DrawRenderers {
            shader_passes: draw.shader_passes.clone(),
            per_object: draw.per_object,
            drawn,
        });
    }

    fn draw_skybox(&mut self, camera: &Camera) {
        self.events.push(ContextEvent::DrawSkybox {
            camera: camera.name.clone(),
        });
    }

    fn submit(&mut self) {
        self.events.push(ContextEvent::Submit);
    }
}
