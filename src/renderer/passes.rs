
use bitflags::bitflags;
use glam::Vec3;

use crate::renderer::context::VisibleRenderer;
use crate::renderer::shader_lib::{passes, queues, RenderLayers};
use crate::scene::RendererId;

bitflags! {
    /// Per-object data the host binds for a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PerObjectData: u32 {
        const LIGHTMAPS = 1;
        const LIGHT_PROBE = 1 << 1;
        const REFLECTION_PROBES = 1 << 2;
    }
}

/// Inclusive render-queue interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderQueueRange {
    pub lower: i32,
    pub upper: i32,
}

impl RenderQueueRange {
    pub const OPAQUE: Self = Self {
        lower: 0,
        upper: queues::GEOMETRY_LAST,
    };
    pub const TRANSPARENT: Self = Self {
        lower: queues::GEOMETRY_LAST + 1,
        upper: queues::MAX,
    };
    pub const ALL: Self = Self {
        lower: 0,
        upper: queues::MAX,
    };

    pub fn contains(&self, queue: i32) -> bool {
        (self.lower..=self.upper).contains(&queue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Front to back, for early depth rejection.
    CommonOpaque,
    /// Back to front, for blending.
    CommonTransparent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawSettings {
    /// Shader passes drawn per object, in order.
    pub shader_passes: Vec<&'static str>,
    pub sort: SortMode,
    pub per_object: PerObjectData,
    pub dynamic_batching: bool,
    pub camera_position: Vec3,
}

impl DrawSettings {
    pub fn new(shader_pass: &'static str, sort: SortMode, camera_position: Vec3) -> Self {
        Self {
            shader_passes: vec![shader_pass],
            sort,
            per_object: PerObjectData::empty(),
            dynamic_batching: false,
            camera_position,
        }
    }

    pub fn with_pass(mut self, shader_pass: &'static str) -> Self {
        self.shader_passes.push(shader_pass);
        self
    }

    pub fn with_per_object(mut self, per_object: PerObjectData) -> Self {
        self.per_object = per_object;
        self
    }

    pub fn with_dynamic_batching(mut self) -> Self {
        self.dynamic_batching = true;
        self
    }
}

/// Which visible renderers a draw accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub queue_range: RenderQueueRange,
    /// Object layers, tested as `1 << layer`.
    pub layer_mask: u32,
    /// Renderer layers that must all be present.
    pub required_layers: RenderLayers,
    /// Renderer layers that must all be absent.
    pub excluded_layers: RenderLayers,
}

impl FilterSettings {
    pub fn new(queue_range: RenderQueueRange, layer_mask: u32) -> Self {
        Self {
            queue_range,
            layer_mask,
            required_layers: RenderLayers::empty(),
            excluded_layers: RenderLayers::empty(),
        }
    }

    pub fn requiring(mut self, layers: RenderLayers) -> Self {
        self.required_layers = layers;
        self
    }

    pub fn excluding(mut self, layers: RenderLayers) -> Self {
        self.excluded_layers = layers;
        self
    }

    pub fn accepts(&self, renderer: &VisibleRenderer) -> bool {
        let layer_bit = 1u32.checked_shl(renderer.layer).unwrap_or(0);
        self.queue_range.contains(renderer.render_queue)
            && self.layer_mask & layer_bit != 0
            && renderer.rendering_layers.contains(self.required_layers)
            && !renderer.rendering_layers.intersects(self.excluded_layers)
    }
}

/// The renderers a draw would submit, in submission order.
pub fn filter_and_sort(
    renderers: &[VisibleRenderer],
    draw: &DrawSettings,
    filter: &FilterSettings,
) -> Vec<RendererId> {
    let mut accepted: Vec<(f32, i32, RendererId)> = renderers
        .iter()
        .filter(|r| filter.accepts(r))
        .map(|r| {
            let distance = (r.bounds.center() - draw.camera_position).length_squared();
            (distance, r.render_queue, r.id)
        })
        .collect();

    // Queue order always wins; distance breaks ties inside a queue.
    accepted.sort_by(|a, b| {
        a.1.cmp(&b.1).then_with(|| match draw.sort {
            SortMode::CommonOpaque => a.0.total_cmp(&b.0),
            SortMode::CommonTransparent => b.0.total_cmp(&a.0),
        })
    });

    accepted.into_iter().map(|(_, _, id)| id).collect()
}

/// Which objects a pass routes by lightmap state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightmapRouting {
    Lightmapped,
    Dynamic,
    Any,
}

/// One entry of the fixed draw schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassDescriptor {
    pub shader_passes: &'static [&'static str],
    pub queue_range: RenderQueueRange,
    pub routing: LightmapRouting,
    pub sort: SortMode,
    pub per_object: PerObjectData,
    pub dynamic_batching: bool,
}

impl PassDescriptor {
    pub fn draw_settings(&self, camera_position: Vec3) -> DrawSettings {
        let mut names = self.shader_passes.iter().copied();
        let first = names.next().unwrap_or(passes::BASE_PASS);
        let settings = names
            .fold(
                DrawSettings::new(first, self.sort, camera_position),
                DrawSettings::with_pass,
            )
            .with_per_object(self.per_object);
        if self.dynamic_batching {
            settings.with_dynamic_batching()
        } else {
            settings
        }
    }

    pub fn filter_settings(&self, layer_mask: u32) -> FilterSettings {
        let filter = FilterSettings::new(self.queue_range, layer_mask);
        match self.routing {
            LightmapRouting::Lightmapped => filter.requiring(RenderLayers::BAKED_LIGHTMAPS),
            LightmapRouting::Dynamic => filter.excluding(RenderLayers::BAKED_LIGHTMAPS),
            LightmapRouting::Any => filter,
        }
    }
}

const OPAQUE_DATA: PerObjectData = PerObjectData::LIGHTMAPS.union(PerObjectData::LIGHT_PROBE);
const REFLECTIVE_DATA: PerObjectData = OPAQUE_DATA.union(PerObjectData::REFLECTION_PROBES);

/// Opaque passes, drawn before the skybox.
pub const OPAQUE_PASSES: [PassDescriptor; 4] = [
    PassDescriptor {
        shader_passes: &[passes::MIXED],
        queue_range: RenderQueueRange::OPAQUE,
        routing: LightmapRouting::Lightmapped,
        sort: SortMode::CommonOpaque,
        per_object: OPAQUE_DATA,
        dynamic_batching: true,
    },
    PassDescriptor {
        shader_passes: &[passes::MIXED_REFLECTIVE],
        queue_range: RenderQueueRange::OPAQUE,
        routing: LightmapRouting::Lightmapped,
        sort: SortMode::CommonOpaque,
        per_object: REFLECTIVE_DATA,
        dynamic_batching: true,
    },
    PassDescriptor {
        shader_passes: &[passes::DYNAMIC],
        queue_range: RenderQueueRange::OPAQUE,
        routing: LightmapRouting::Dynamic,
        sort: SortMode::CommonOpaque,
        per_object: OPAQUE_DATA,
        dynamic_batching: true,
    },
    PassDescriptor {
        shader_passes: &[passes::DYNAMIC_REFLECTIVE],
        queue_range: RenderQueueRange::OPAQUE,
        routing: LightmapRouting::Dynamic,
        sort: SortMode::CommonOpaque,
        per_object: REFLECTIVE_DATA,
        dynamic_batching: true,
    },
];

/// Depth prime then transparent colour, drawn after the skybox.
pub const TRANSPARENT_PASS: PassDescriptor = PassDescriptor {
    shader_passes: &[passes::ZPRIME, passes::TRANSPARENT],
    queue_range: RenderQueueRange::TRANSPARENT,
    routing: LightmapRouting::Any,
    sort: SortMode::CommonTransparent,
    per_object: PerObjectData::empty(),
    dynamic_batching: false,
};
