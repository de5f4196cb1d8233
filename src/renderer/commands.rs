use glam::{Mat4, UVec2, Vec4};

use crate::scene::RendererId;

/// Pixel rectangle, origin at the bottom-left of the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(size: UVec2) -> Self {
        Self::new(0.0, 0.0, size.x as f32, size.y as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Default,
    RgHalf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Point,
    Bilinear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTextureDescriptor {
    pub size: UVec2,
    pub format: TextureFormat,
    pub depth_bits: u32,
    pub filter: FilterMode,
}

impl RenderTextureDescriptor {
    pub fn new(size: UVec2, format: TextureFormat, depth_bits: u32) -> Self {
        Self {
            size,
            format,
            depth_bits,
            filter: FilterMode::Point,
        }
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// A temporary target identified by its global shader name.
    Temporary(&'static str),
    /// The camera's own output.
    CameraTarget,
}

/// A recorded command. Executed in order by the host's command service.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SetGlobalFloat {
        name: &'static str,
        value: f32,
    },
    SetGlobalVector {
        name: &'static str,
        value: Vec4,
    },
    SetGlobalVectorArray {
        name: &'static str,
        values: Vec<Vec4>,
    },
    SetGlobalMatrixArray {
        name: &'static str,
        values: Vec<Mat4>,
    },
    EnableKeyword(&'static str),
    DisableKeyword(&'static str),
    GetTemporaryRenderTarget {
        name: &'static str,
        descriptor: RenderTextureDescriptor,
    },
    ReleaseTemporaryRenderTarget(&'static str),
    SetRenderTarget(RenderTarget),
    ClearRenderTarget {
        clear_depth: bool,
        clear_color: bool,
        color: Vec4,
        depth: f32,
    },
    SetViewport(Viewport),
    SetViewProjectionMatrices {
        view: Mat4,
        projection: Mat4,
    },
    /// Draws one renderer with an explicit pass of the shadow material.
    DrawRenderer {
        renderer: RendererId,
        pass: u32,
    },
    Blit {
        source: RenderTarget,
        destination: RenderTarget,
    },
}

/// Ordered list of commands handed to the host in one go.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandBuffer {
    pub name: String,
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn set_global_float(&mut self, name: &'static str, value: f32) {
        self.push(Command::SetGlobalFloat { name, value });
    }

    pub fn set_global_vector(&mut self, name: &'static str, value: Vec4) {
        self.push(Command::SetGlobalVector { name, value });
    }

    pub fn set_global_vector_array(&mut self, name: &'static str, values: Vec<Vec4>) {
        self.push(Command::SetGlobalVectorArray { name, values });
    }

    pub fn set_global_matrix_array(&mut self, name: &'static str, values: Vec<Mat4>) {
        self.push(Command::SetGlobalMatrixArray { name, values });
    }

    pub fn set_keyword(&mut self, keyword: &'static str, enabled: bool) {
        if enabled {
            self.push(Command::EnableKeyword(keyword));
        } else {
            self.push(Command::DisableKeyword(keyword));
        }
    }

    pub fn get_temporary_rt(&mut self, name: &'static str, descriptor: RenderTextureDescriptor) {
        self.push(Command::GetTemporaryRenderTarget { name, descriptor });
    }

    pub fn release_temporary_rt(&mut self, name: &'static str) {
        self.push(Command::ReleaseTemporaryRenderTarget(name));
    }

    pub fn set_render_target(&mut self, target: RenderTarget) {
        self.push(Command::SetRenderTarget(target));
    }

    pub fn clear_render_target(&mut self, clear_depth: bool, clear_color: bool, color: Vec4) {
        self.push(Command::ClearRenderTarget {
            clear_depth,
            clear_color,
            color,
            depth: 1.0,
        });
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.push(Command::SetViewport(viewport));
    }

    pub fn set_view_projection_matrices(&mut self, view: Mat4, projection: Mat4) {
        self.push(Command::SetViewProjectionMatrices { view, projection });
    }

    pub fn draw_renderer(&mut self, renderer: RendererId, pass: u32) {
        self.push(Command::DrawRenderer { renderer, pass });
    }

    pub fn blit(&mut self, source: RenderTarget, destination: RenderTarget) {
        self.push(Command::Blit {
            source,
            destination,
        });
    }
}
